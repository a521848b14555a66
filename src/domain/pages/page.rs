use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which representation of a page a caller is working against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Draft,
    Live,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    HtmlText,
    Text,
    Varchar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }
}

pub const DEFAULT_PAGE_TYPE: &str = "Page";

pub static PAGE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("MenuTitle", FieldKind::Varchar),
    FieldSpec::new("Content", FieldKind::HtmlText),
    FieldSpec::new("MetaDescription", FieldKind::Text),
];

/// Declared fields per page type. Order of registration is the order fields are scanned in.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    types: HashMap<String, Vec<FieldSpec>>,
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        let mut registry = Self {
            types: HashMap::new(),
        };
        registry.register(DEFAULT_PAGE_TYPE, PAGE_FIELDS);
        registry
    }
}

impl SchemaRegistry {
    pub fn register(&mut self, page_type: &str, fields: &[FieldSpec]) -> &mut Self {
        self.types.insert(page_type.to_string(), fields.to_vec());
        self
    }

    pub fn fields_for(&self, page_type: &str) -> Option<&[FieldSpec]> {
        self.types.get(page_type).map(|v| v.as_slice())
    }

    pub fn html_fields(&self, page_type: &str) -> Option<Vec<&'static str>> {
        self.fields_for(page_type).map(|fields| {
            fields
                .iter()
                .filter(|f| f.kind == FieldKind::HtmlText)
                .map(|f| f.name)
                .collect()
        })
    }

    pub fn declares(&self, page_type: &str, field_name: &str) -> bool {
        self.fields_for(page_type)
            .map(|fields| fields.iter().any(|f| f.name == field_name))
            .unwrap_or(false)
    }
}

/// Working (draft) copy of a page in the site tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// `None` until the page has been written for the first time.
    pub id: Option<i64>,
    pub page_type: String,
    pub title: String,
    pub fields: BTreeMap<String, String>,
    pub has_broken_link: bool,
    pub has_broken_file: bool,
    pub last_edited: DateTime<Utc>,
}

impl Page {
    pub fn new(page_type: &str, title: &str) -> Self {
        Self {
            id: None,
            page_type: page_type.to_string(),
            title: title.to_string(),
            fields: BTreeMap::new(),
            has_broken_link: false,
            has_broken_file: false,
            last_edited: Utc::now(),
        }
    }

    pub fn with_field(mut self, name: &str, value: &str) -> Self {
        self.set_field(name, value);
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn set_field(&mut self, name: &str, value: impl Into<String>) {
        self.fields.insert(name.to_string(), value.into());
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn is_broken(&self) -> bool {
        self.has_broken_link || self.has_broken_file
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_registry_lists_content_as_html() {
        let registry = SchemaRegistry::default();
        assert_eq!(registry.html_fields("Page"), Some(vec!["Content"]));
        assert!(registry.declares("Page", "MetaDescription"));
        assert!(!registry.declares("Page", "Body"));
        assert!(registry.html_fields("RedirectorPage").is_none());
    }

    #[test]
    fn html_fields_keep_declared_order() {
        let mut registry = SchemaRegistry::default();
        registry.register(
            "BlogPost",
            &[
                FieldSpec::new("Summary", FieldKind::HtmlText),
                FieldSpec::new("Author", FieldKind::Varchar),
                FieldSpec::new("Content", FieldKind::HtmlText),
            ],
        );
        assert_eq!(
            registry.html_fields("BlogPost"),
            Some(vec!["Summary", "Content"])
        );
    }

    #[test]
    fn new_page_is_not_persisted() {
        let page = Page::new("Page", "About").with_field("Content", "<p>hi</p>");
        assert!(!page.is_persisted());
        assert_eq!(page.field("Content"), Some("<p>hi</p>"));
        assert!(!page.is_broken());
    }
}
