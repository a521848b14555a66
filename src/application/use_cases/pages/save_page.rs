use std::collections::BTreeMap;

use chrono::Utc;

use crate::application::error::TrackingError;
use crate::application::linktracking::LinkTracker;
use crate::application::ports::files_repository::FilesRepository;
use crate::application::ports::link_tracking_repository::LinkTrackingRepository;
use crate::application::ports::page_repository::PageRepository;
use crate::application::ports::url_normalizer::UrlNormalizer;
use crate::domain::pages::page::{Page, Stage};

#[derive(Debug, Clone, Default)]
pub struct PageEdits {
    pub title: Option<String>,
    pub fields: BTreeMap<String, String>,
}

/// Writes draft edits and keeps link tracking in step, the way a page's save hook would.
pub struct SavePage<'a, P, F, L, U>
where
    P: PageRepository + ?Sized,
    F: FilesRepository + ?Sized,
    L: LinkTrackingRepository + ?Sized,
    U: UrlNormalizer + ?Sized,
{
    pub tracker: &'a LinkTracker<'a, P, F, L, U>,
}

impl<'a, P, F, L, U> SavePage<'a, P, F, L, U>
where
    P: PageRepository + ?Sized,
    F: FilesRepository + ?Sized,
    L: LinkTrackingRepository + ?Sized,
    U: UrlNormalizer + ?Sized,
{
    pub async fn create(&self, page_type: &str, edits: PageEdits) -> anyhow::Result<Page> {
        if self.tracker.schema.fields_for(page_type).is_none() {
            return Err(TrackingError::UnknownPageType(page_type.to_string()).into());
        }
        let mut page = Page::new(page_type, "");
        self.apply(&mut page, edits)?;
        // edges need an owner id, so the row exists before the first scan
        page.id = Some(self.tracker.pages.insert_draft(&page).await?);
        self.tracker.synchronize(&mut page, Stage::Draft).await?;
        self.tracker.pages.save_draft(&page).await?;
        tracing::info!(page_id = ?page.id, page_type, "page_created");
        Ok(page)
    }

    // Returns None if the page does not exist
    pub async fn update(&self, id: i64, edits: PageEdits) -> anyhow::Result<Option<Page>> {
        let Some(mut page) = self.tracker.pages.get_draft(id).await? else {
            return Ok(None);
        };
        self.apply(&mut page, edits)?;
        self.tracker.synchronize(&mut page, Stage::Draft).await?;
        self.tracker.pages.save_draft(&page).await?;
        Ok(Some(page))
    }

    fn apply(&self, page: &mut Page, edits: PageEdits) -> Result<(), TrackingError> {
        if let Some(field) = edits
            .fields
            .keys()
            .find(|name| !self.tracker.schema.declares(&page.page_type, name))
        {
            return Err(TrackingError::UnknownField {
                page_type: page.page_type.clone(),
                field: field.clone(),
            });
        }
        if let Some(title) = edits.title {
            page.title = title;
        }
        page.fields.extend(edits.fields);
        page.last_edited = Utc::now();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::linktracking::DEFAULT_BROKEN_CLASS;
    use crate::domain::links::link::TrackingRelation;
    use crate::domain::pages::page::SchemaRegistry;
    use crate::infrastructure::memory::InMemoryStore;
    use crate::infrastructure::url::SiteUrlNormalizer;

    fn edits(content: &str) -> PageEdits {
        PageEdits {
            title: Some("Home".into()),
            fields: BTreeMap::from([("Content".to_string(), content.to_string())]),
        }
    }

    #[tokio::test]
    async fn create_inserts_then_tracks_links() {
        let store = InMemoryStore::default();
        let urls = SiteUrlNormalizer::default();
        let schema = SchemaRegistry::default();
        let tracker = LinkTracker {
            pages: &store,
            files: &store,
            tracking: &store,
            urls: &urls,
            schema: &schema,
            broken_class: DEFAULT_BROKEN_CLASS,
        };
        let target = store.put_page(Page::new("Page", "About"));
        let uc = SavePage { tracker: &tracker };

        let page = uc
            .create("Page", edits(&format!("<a href=\"[sitetree_link id={target}]\">a</a>")))
            .await
            .unwrap();

        let id = page.id.unwrap();
        assert_eq!(store.page(id).unwrap(), page);
        let edges = store.edges(TrackingRelation::LinkTracking);
        assert_eq!(edges.len(), 1);
        assert_eq!(edges[0].owner_id, id);
        assert_eq!(edges[0].target_id, target);
    }

    #[tokio::test]
    async fn update_rejects_undeclared_fields_and_missing_pages() {
        let store = InMemoryStore::default();
        let urls = SiteUrlNormalizer::default();
        let schema = SchemaRegistry::default();
        let tracker = LinkTracker {
            pages: &store,
            files: &store,
            tracking: &store,
            urls: &urls,
            schema: &schema,
            broken_class: DEFAULT_BROKEN_CLASS,
        };
        let uc = SavePage { tracker: &tracker };
        let id = store.put_page(Page::new("Page", "Old"));

        let mut bad = edits("");
        bad.fields.insert("Body".into(), "x".into());
        let err = uc.update(id, bad).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<TrackingError>(),
            Some(TrackingError::UnknownField { field, .. }) if field == "Body"
        ));
        assert_eq!(store.page(id).unwrap().title, "Old");

        assert!(uc.update(id + 100, edits("")).await.unwrap().is_none());
        assert!(uc.create("Nope", edits("")).await.is_err());

        let saved = uc.update(id, edits("<a href=\"/x\">x</a>")).await.unwrap().unwrap();
        assert!(saved.has_broken_link);
        assert_eq!(saved.title, "Home");
    }
}
