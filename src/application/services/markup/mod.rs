//! Owned, flat view over HTML-like markup.
//!
//! The document keeps every start tag in an arena and everything else (text, end tags, comments)
//! as opaque text runs. Tags are addressed by [`ElementId`]. Serializing re-emits every start tag
//! in canonical form: double-quoted, entity-escaped values and ` />` for self-closing tags. Text
//! runs are copied through as-is, so a second parse and serialize returns the same string.

use once_cell::sync::Lazy;
use regex::Regex;

static TAG_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?s)<!--.*?-->|<([A-Za-z][A-Za-z0-9:-]*)((?:\s+[^\s"'>/=]+(?:\s*=\s*(?:"[^"]*"|'[^']*'|[^\s>]+))?)*)\s*(/?)>"#,
    )
    .unwrap()
});

static ATTR_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"([^\s"'>/=]+)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+)))?"#).unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(usize);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    /// Entity-decoded value; `None` for bare attributes like `<input disabled>`.
    pub value: Option<String>,
}

#[derive(Debug, Clone)]
struct Element {
    name: String,
    attributes: Vec<Attribute>,
    self_closing: bool,
}

impl Element {
    fn render(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for attr in &self.attributes {
            out.push(' ');
            out.push_str(&attr.name);
            if let Some(value) = &attr.value {
                out.push_str("=\"");
                out.push_str(&htmlescape::encode_minimal(value));
                out.push('"');
            }
        }
        if self.self_closing {
            out.push_str(" /");
        }
        out.push('>');
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.attributes
            .iter()
            .position(|a| a.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone)]
enum Segment {
    Text(String),
    Element(ElementId),
}

#[derive(Debug, Clone, Default)]
pub struct MarkupDocument {
    segments: Vec<Segment>,
    elements: Vec<Element>,
}

impl MarkupDocument {
    /// Never fails; anything that does not look like a start tag is kept as text.
    pub fn parse(markup: &str) -> Self {
        let mut doc = Self::default();
        let mut last = 0usize;
        for cap in TAG_RE.captures_iter(markup) {
            // comments match without a tag name and stay inside the surrounding text run
            let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
                continue;
            };
            if whole.start() > last {
                doc.segments
                    .push(Segment::Text(markup[last..whole.start()].to_string()));
            }
            let attributes = cap
                .get(2)
                .map(|m| parse_attributes(m.as_str()))
                .unwrap_or_default();
            let id = ElementId(doc.elements.len());
            doc.elements.push(Element {
                name: name.as_str().to_string(),
                attributes,
                self_closing: cap.get(3).map(|m| !m.as_str().is_empty()).unwrap_or(false),
            });
            doc.segments.push(Segment::Element(id));
            last = whole.end();
        }
        if last < markup.len() {
            doc.segments.push(Segment::Text(markup[last..].to_string()));
        }
        doc
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn elements_by_tag(&self, tag: &str) -> Vec<ElementId> {
        self.elements
            .iter()
            .enumerate()
            .filter(|(_, el)| el.name.eq_ignore_ascii_case(tag))
            .map(|(idx, _)| ElementId(idx))
            .collect()
    }

    /// `<a>` start tags in document order.
    pub fn anchors(&self) -> Vec<ElementId> {
        self.elements_by_tag("a")
    }

    pub fn has_attribute(&self, id: ElementId, name: &str) -> bool {
        self.elements
            .get(id.0)
            .and_then(|el| el.position(name))
            .is_some()
    }

    /// Bare attributes read as the empty string.
    pub fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        let el = self.elements.get(id.0)?;
        let attr = &el.attributes[el.position(name)?];
        Some(attr.value.as_deref().unwrap_or(""))
    }

    pub fn set_attribute(&mut self, id: ElementId, name: &str, value: &str) {
        let Some(el) = self.elements.get_mut(id.0) else {
            return;
        };
        match el.position(name) {
            Some(pos) => el.attributes[pos].value = Some(value.to_string()),
            None => el.attributes.push(Attribute {
                name: name.to_string(),
                value: Some(value.to_string()),
            }),
        }
    }

    pub fn remove_attribute(&mut self, id: ElementId, name: &str) -> bool {
        let Some(el) = self.elements.get_mut(id.0) else {
            return false;
        };
        match el.position(name) {
            Some(pos) => {
                el.attributes.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Element(id) => self.elements[id.0].render(&mut out),
            }
        }
        out
    }
}

fn parse_attributes(raw: &str) -> Vec<Attribute> {
    ATTR_RE
        .captures_iter(raw)
        .filter_map(|cap| {
            let name = cap.get(1)?.as_str().to_string();
            let value = cap
                .get(2)
                .or_else(|| cap.get(3))
                .or_else(|| cap.get(4))
                .map(|m| decode_entities(m.as_str()));
            Some(Attribute { name, value })
        })
        .collect()
}

fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    htmlescape::decode_html(raw).unwrap_or_else(|_| raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_is_serialized_canonically() {
        let src = "<p class='intro'>Hi <a  href=\"x\" >there</a><!-- <a href=\"y\"> --><br/><h2 id=top>T</h2></p> tail";
        let html = MarkupDocument::parse(src).to_html();
        assert_eq!(
            html,
            "<p class=\"intro\">Hi <a href=\"x\">there</a><!-- <a href=\"y\"> --><br /><h2 id=\"top\">T</h2></p> tail"
        );
        assert_eq!(MarkupDocument::parse(&html).to_html(), html);
    }

    #[test]
    fn unquoted_values_run_to_whitespace_or_close() {
        let doc = MarkupDocument::parse("<a href=/about?x=1>x</a><a href=\"/about\" data-x=a=b>y</a>");
        let anchors = doc.anchors();
        assert_eq!(anchors.len(), 2);
        assert_eq!(doc.attribute(anchors[0], "href"), Some("/about?x=1"));
        assert_eq!(doc.attribute(anchors[1], "data-x"), Some("a=b"));
        assert_eq!(
            doc.to_html(),
            "<a href=\"/about?x=1\">x</a><a href=\"/about\" data-x=\"a=b\">y</a>"
        );
    }

    #[test]
    fn anchors_are_listed_in_order_and_comments_skipped() {
        let doc = MarkupDocument::parse(
            "<A href=\"one\">1</A><!-- <a href=\"hidden\"> --><span><a href='two'>2</a></span>",
        );
        let anchors = doc.anchors();
        assert_eq!(anchors.len(), 2);
        assert_eq!(doc.attribute(anchors[0], "HREF"), Some("one"));
        assert_eq!(doc.attribute(anchors[1], "href"), Some("two"));
    }

    #[test]
    fn attribute_reads_decode_entities_and_bare_attributes() {
        let doc = MarkupDocument::parse("<a href=\"?a=1&amp;b=2\" download>f</a><a>none</a>");
        let anchors = doc.anchors();
        assert_eq!(doc.attribute(anchors[0], "href"), Some("?a=1&b=2"));
        assert_eq!(doc.attribute(anchors[0], "download"), Some(""));
        assert!(!doc.has_attribute(anchors[1], "href"));
        assert_eq!(doc.attribute(anchors[1], "href"), None);
    }

    #[test]
    fn changed_tags_are_rewritten_canonically() {
        let mut doc = MarkupDocument::parse("<p><a href='[sitetree_link id=99]'>x</a></p>");
        let a = doc.anchors()[0];
        doc.set_attribute(a, "class", "ss-broken");
        assert_eq!(
            doc.to_html(),
            "<p><a href=\"[sitetree_link id=99]\" class=\"ss-broken\">x</a></p>"
        );
        assert!(doc.remove_attribute(a, "class"));
        assert_eq!(doc.to_html(), "<p><a href=\"[sitetree_link id=99]\">x</a></p>");
    }

    #[test]
    fn setting_the_same_value_keeps_attribute_order() {
        let mut doc = MarkupDocument::parse("<a class = 'ss-broken'  href=x>x</a>");
        let a = doc.anchors()[0];
        doc.set_attribute(a, "class", "ss-broken");
        assert!(!doc.remove_attribute(a, "title"));
        assert_eq!(doc.to_html(), "<a class=\"ss-broken\" href=\"x\">x</a>");
    }

    #[test]
    fn values_are_escaped_on_rewrite() {
        let mut doc = MarkupDocument::parse("<img src=\"a.png\"/>");
        let img = doc.elements_by_tag("img")[0];
        doc.set_attribute(img, "alt", "\"quoted\" & <b>");
        assert_eq!(
            doc.to_html(),
            "<img src=\"a.png\" alt=\"&quot;quoted&quot; &amp; &lt;b&gt;\" />"
        );
    }

    #[test]
    fn empty_input_has_no_segments() {
        let doc = MarkupDocument::parse("");
        assert!(doc.is_empty());
        assert!(doc.anchors().is_empty());
        assert_eq!(doc.to_html(), "");
    }
}
