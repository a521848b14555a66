use serde::{Deserialize, Serialize};

use crate::application::services::markup::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkKind {
    InternalPage,
    File,
    Image,
    LocalAnchor,
    Broken,
    Unknown,
}

impl LinkKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkKind::InternalPage => "internal_page",
            LinkKind::File => "file",
            LinkKind::Image => "image",
            LinkKind::LocalAnchor => "local_anchor",
            LinkKind::Broken => "broken",
            LinkKind::Unknown => "unknown",
        }
    }
}

/// One link found while scanning a field. Lives only for the duration of that scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkDescriptor {
    pub kind: LinkKind,
    pub target: Option<i64>,
    pub anchor: Option<String>,
    /// Anchor element the link came from; `None` for shortcodes found in raw text.
    #[serde(skip)]
    pub element: Option<ElementId>,
    pub is_broken: bool,
}

impl LinkDescriptor {
    pub fn broken(element: ElementId) -> Self {
        Self {
            kind: LinkKind::Broken,
            target: None,
            anchor: None,
            element: Some(element),
            is_broken: true,
        }
    }

    pub fn internal_page(
        target: i64,
        anchor: Option<String>,
        element: ElementId,
        is_broken: bool,
    ) -> Self {
        Self {
            kind: LinkKind::InternalPage,
            target: Some(target),
            anchor,
            element: Some(element),
            is_broken,
        }
    }

    pub fn file(target: i64, element: ElementId, is_broken: bool) -> Self {
        Self {
            kind: LinkKind::File,
            target: Some(target),
            anchor: None,
            element: Some(element),
            is_broken,
        }
    }

    pub fn image(target: i64, is_broken: bool) -> Self {
        Self {
            kind: LinkKind::Image,
            target: Some(target),
            anchor: None,
            element: None,
            is_broken,
        }
    }

    pub fn local_anchor(anchor: String, element: ElementId, is_broken: bool) -> Self {
        Self {
            kind: LinkKind::LocalAnchor,
            target: None,
            anchor: Some(anchor),
            element: Some(element),
            is_broken,
        }
    }
}
