use once_cell::sync::Lazy;
use regex::Regex;

use crate::application::linktracking::descriptor::LinkDescriptor;
use crate::application::ports::files_repository::FilesRepository;
use crate::application::ports::page_repository::PageRepository;
use crate::application::ports::url_normalizer::UrlNormalizer;
use crate::application::services::markup::MarkupDocument;

static SITETREE_LINK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)^\[sitetree_link(?:\s*|%20|,)?id=([0-9]+)\](?:#(.*))?").unwrap()
});
static FILE_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\[file_link(?:\s*|%20|,)?id=([0-9]+)").unwrap());
// attributes before id are unconstrained but must stay inside one shortcode
static IMAGE_SHORTCODE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\[image\b[^\]]*?\sid\s*=\s*["']?([0-9]+)"#).unwrap()
});

/// Scans one parsed field for anchors and embed shortcodes and resolves each against the site.
pub struct LinkParser<'a, P, F, U>
where
    P: PageRepository + ?Sized,
    F: FilesRepository + ?Sized,
    U: UrlNormalizer + ?Sized,
{
    pub pages: &'a P,
    pub files: &'a F,
    pub urls: &'a U,
}

impl<'a, P, F, U> LinkParser<'a, P, F, U>
where
    P: PageRepository + ?Sized,
    F: FilesRepository + ?Sized,
    U: UrlNormalizer + ?Sized,
{
    pub async fn process(&self, doc: &MarkupDocument) -> anyhow::Result<Vec<LinkDescriptor>> {
        let mut links = Vec::new();
        if doc.is_empty() {
            return Ok(links);
        }
        let html = doc.to_html();

        for element in doc.anchors() {
            let Some(raw_href) = doc.attribute(element, "href") else {
                continue;
            };
            let href = self.urls.make_relative(raw_href);

            if href.is_empty() || href.starts_with('/') {
                links.push(LinkDescriptor::broken(element));
                continue;
            }

            if let Some(cap) = SITETREE_LINK_RE.captures(&href) {
                let Some(id) = parse_id(cap.get(1).map(|m| m.as_str())) else {
                    tracing::debug!(href = %href, "shortcode_id_out_of_range");
                    continue;
                };
                let anchor = cap
                    .get(2)
                    .map(|m| m.as_str().to_string())
                    .filter(|a| !a.is_empty());
                let is_broken = match self.pages.find_body(id).await? {
                    None => true,
                    Some(body) => match &anchor {
                        // stored bodies may predate canonical serialization
                        Some(anchor) => {
                            !contains_anchor(&MarkupDocument::parse(&body).to_html(), anchor)
                        }
                        None => false,
                    },
                };
                links.push(LinkDescriptor::internal_page(id, anchor, element, is_broken));
                continue;
            }

            if let Some(cap) = FILE_LINK_RE.captures(&href) {
                let Some(id) = parse_id(cap.get(1).map(|m| m.as_str())) else {
                    tracing::debug!(href = %href, "shortcode_id_out_of_range");
                    continue;
                };
                let is_broken = !self.files.file_exists(id).await?;
                links.push(LinkDescriptor::file(id, element, is_broken));
                continue;
            }

            if let Some(fragment) = href.strip_prefix('#') {
                let is_broken = !contains_anchor(&html, fragment);
                links.push(LinkDescriptor::local_anchor(
                    fragment.to_string(),
                    element,
                    is_broken,
                ));
                continue;
            }
            // external, mailto:, relative paths: not tracked
        }

        let image_ids: Vec<i64> = IMAGE_SHORTCODE_RE
            .captures_iter(&html)
            .filter_map(|cap| parse_id(cap.get(1).map(|m| m.as_str())))
            .collect();
        for id in image_ids {
            let is_broken = !self.files.file_exists(id).await?;
            links.push(LinkDescriptor::image(id, is_broken));
        }

        for link in links.iter().filter(|l| l.is_broken) {
            tracing::debug!(kind = link.kind.as_str(), target = ?link.target, anchor = ?link.anchor, "broken_link_found");
        }
        tracing::debug!(count = links.len(), "links_parsed");
        Ok(links)
    }
}

fn parse_id(digits: Option<&str>) -> Option<i64> {
    digits.and_then(|d| d.parse::<i64>().ok())
}

/// Substring match for `name="anchor"` or `id="anchor"` anywhere in canonically serialized markup.
pub fn contains_anchor(markup: &str, anchor: &str) -> bool {
    let encoded = htmlescape::encode_minimal(anchor);
    let pattern = format!(r#"(?:name|id)="{}""#, regex::escape(&encoded));
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(markup),
        Err(err) => {
            tracing::warn!(error = ?err, anchor, "anchor_pattern_invalid");
            false
        }
    }
}
