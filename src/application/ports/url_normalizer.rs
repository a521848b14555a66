/// Turns an href into its site-relative form.
pub trait UrlNormalizer: Send + Sync {
    fn make_relative(&self, href: &str) -> String;
}
