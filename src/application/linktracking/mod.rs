//! Link tracking for rich-text page fields.
//!
//! [`parser::LinkParser`] finds anchors and embed shortcodes in one field; [`LinkTracker`] runs it
//! over every HTML field of a page, marks broken anchors with a CSS class, updates the page's
//! broken flags and rewrites the page's tracking edges for each field.

pub mod descriptor;
pub mod parser;

use crate::application::error::TrackingError;
use crate::application::linktracking::descriptor::{LinkDescriptor, LinkKind};
use crate::application::linktracking::parser::LinkParser;
use crate::application::ports::files_repository::FilesRepository;
use crate::application::ports::link_tracking_repository::LinkTrackingRepository;
use crate::application::ports::page_repository::PageRepository;
use crate::application::ports::url_normalizer::UrlNormalizer;
use crate::application::services::markup::MarkupDocument;
use crate::domain::links::link::TrackingRelation;
use crate::domain::pages::page::{Page, SchemaRegistry, Stage};

pub const DEFAULT_BROKEN_CLASS: &str = "ss-broken";

/// Outcome of scanning one field.
#[derive(Debug, Clone, Default)]
pub struct FieldScan {
    pub field_name: String,
    pub links: Vec<LinkDescriptor>,
    pub page_targets: Vec<i64>,
    pub file_targets: Vec<i64>,
    pub has_broken_link: bool,
    pub has_broken_file: bool,
}

pub struct LinkTracker<'a, P, F, L, U>
where
    P: PageRepository + ?Sized,
    F: FilesRepository + ?Sized,
    L: LinkTrackingRepository + ?Sized,
    U: UrlNormalizer + ?Sized,
{
    pub pages: &'a P,
    pub files: &'a F,
    pub tracking: &'a L,
    pub urls: &'a U,
    pub schema: &'a SchemaRegistry,
    pub broken_class: &'a str,
}

impl<'a, P, F, L, U> LinkTracker<'a, P, F, L, U>
where
    P: PageRepository + ?Sized,
    F: FilesRepository + ?Sized,
    L: LinkTrackingRepository + ?Sized,
    U: UrlNormalizer + ?Sized,
{
    pub fn parser(&self) -> LinkParser<'a, P, F, U> {
        LinkParser {
            pages: self.pages,
            files: self.files,
            urls: self.urls,
        }
    }

    /// Rescans every HTML field of a draft page. Live pages are left alone.
    /// Mutates the page in memory only; the caller saves it.
    pub async fn synchronize(&self, page: &mut Page, stage: Stage) -> anyhow::Result<()> {
        if stage == Stage::Live {
            return Ok(());
        }
        let fields = self
            .schema
            .html_fields(&page.page_type)
            .ok_or_else(|| TrackingError::UnknownPageType(page.page_type.clone()))?;

        page.has_broken_link = false;
        page.has_broken_file = false;
        for field_name in &fields {
            self.track_links_in_field(page, field_name).await?;
        }

        tracing::info!(
            page_id = ?page.id,
            fields = fields.len(),
            has_broken_link = page.has_broken_link,
            has_broken_file = page.has_broken_file,
            "link_tracking_synchronized"
        );
        Ok(())
    }

    /// Scans one field, rewrites its markup and, for persisted pages, its tracking edges.
    /// Only ever raises the page's broken flags.
    pub async fn track_links_in_field(
        &self,
        page: &mut Page,
        field_name: &str,
    ) -> anyhow::Result<FieldScan> {
        let mut doc = MarkupDocument::parse(page.field(field_name).unwrap_or_default());
        let links = self.parser().process(&doc).await?;

        for link in &links {
            let Some(element) = link.element else {
                continue;
            };
            let mut classes: Vec<String> = Vec::new();
            for class in doc
                .attribute(element, "class")
                .unwrap_or_default()
                .split_whitespace()
            {
                if !classes.iter().any(|c| c == class) {
                    classes.push(class.to_string());
                }
            }
            if link.is_broken {
                if !classes.iter().any(|c| c == self.broken_class) {
                    classes.push(self.broken_class.to_string());
                }
            } else {
                classes.retain(|c| c != self.broken_class);
            }
            if classes.is_empty() {
                doc.remove_attribute(element, "class");
            } else {
                doc.set_attribute(element, "class", &classes.join(" "));
            }
        }
        page.set_field(field_name, doc.to_html());

        let mut scan = FieldScan {
            field_name: field_name.to_string(),
            ..FieldScan::default()
        };
        for link in &links {
            match link.kind {
                LinkKind::InternalPage if link.is_broken => scan.has_broken_link = true,
                LinkKind::InternalPage => push_target(&mut scan.page_targets, link.target),
                LinkKind::File | LinkKind::Image if link.is_broken => scan.has_broken_file = true,
                LinkKind::File | LinkKind::Image => push_target(&mut scan.file_targets, link.target),
                // local anchors are validated but never become edges
                _ if link.is_broken => scan.has_broken_link = true,
                _ => {}
            }
        }
        page.has_broken_link |= scan.has_broken_link;
        page.has_broken_file |= scan.has_broken_file;

        if let Some(owner_id) = page.id {
            self.tracking
                .replace_field_edges(
                    TrackingRelation::LinkTracking,
                    owner_id,
                    field_name,
                    &scan.page_targets,
                )
                .await?;
            self.tracking
                .replace_field_edges(
                    TrackingRelation::ImageTracking,
                    owner_id,
                    field_name,
                    &scan.file_targets,
                )
                .await?;
        }

        tracing::debug!(
            page_id = ?page.id,
            field = field_name,
            links = links.len(),
            pages = scan.page_targets.len(),
            files = scan.file_targets.len(),
            "field_links_tracked"
        );
        scan.links = links;
        Ok(scan)
    }
}

fn push_target(targets: &mut Vec<i64>, target: Option<i64>) {
    if let Some(target) = target {
        if !targets.contains(&target) {
            targets.push(target);
        }
    }
}
