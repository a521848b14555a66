use url::Url;

use crate::application::ports::url_normalizer::UrlNormalizer;

/// Strips the site's own origin and base path from absolute links.
///
/// Anything that is not an absolute http(s) URL on the configured host is returned trimmed but
/// otherwise unchanged, so shortcodes, fragments and foreign links pass straight through.
#[derive(Debug, Clone, Default)]
pub struct SiteUrlNormalizer {
    base: Option<Url>,
}

impl SiteUrlNormalizer {
    pub fn new(base_url: Option<&str>) -> anyhow::Result<Self> {
        let base = match base_url.map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(Url::parse(raw)?),
            None => None,
        };
        Ok(Self { base })
    }

    fn strip_base<'u>(&self, base: &Url, url: &'u Url) -> Option<&'u str> {
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        if url.host_str() != base.host_str() || url.port() != base.port() {
            return None;
        }
        let base_path = base.path().trim_end_matches('/');
        let path = url.path();
        if base_path.is_empty() {
            return Some(path);
        }
        match path.strip_prefix(base_path) {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => Some(rest),
            _ => None,
        }
    }
}

impl UrlNormalizer for SiteUrlNormalizer {
    fn make_relative(&self, href: &str) -> String {
        let href = href.trim();
        let Some(base) = &self.base else {
            return href.to_string();
        };
        let Ok(url) = Url::parse(href) else {
            return href.to_string();
        };
        let Some(rest) = self.strip_base(base, &url) else {
            return href.to_string();
        };
        let mut relative = rest.trim_start_matches('/').to_string();
        if let Some(query) = url.query() {
            relative.push('?');
            relative.push_str(query);
        }
        if let Some(fragment) = url.fragment() {
            relative.push('#');
            relative.push_str(fragment);
        }
        relative
    }
}
