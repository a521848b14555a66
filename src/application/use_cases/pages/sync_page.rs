use crate::application::error::TrackingError;
use crate::application::linktracking::LinkTracker;
use crate::application::ports::files_repository::FilesRepository;
use crate::application::ports::link_tracking_repository::LinkTrackingRepository;
use crate::application::ports::page_repository::PageRepository;
use crate::application::ports::url_normalizer::UrlNormalizer;
use crate::domain::pages::page::{Page, Stage};

pub struct SyncPage<'a, P, F, L, U>
where
    P: PageRepository + ?Sized,
    F: FilesRepository + ?Sized,
    L: LinkTrackingRepository + ?Sized,
    U: UrlNormalizer + ?Sized,
{
    pub tracker: &'a LinkTracker<'a, P, F, L, U>,
}

impl<'a, P, F, L, U> SyncPage<'a, P, F, L, U>
where
    P: PageRepository + ?Sized,
    F: FilesRepository + ?Sized,
    L: LinkTrackingRepository + ?Sized,
    U: UrlNormalizer + ?Sized,
{
    // Errors with PageNotFound if the page does not exist
    pub async fn execute(&self, id: i64) -> anyhow::Result<Page> {
        let mut page = self
            .tracker
            .pages
            .get_draft(id)
            .await?
            .ok_or(TrackingError::PageNotFound(id))?;
        self.tracker.synchronize(&mut page, Stage::Draft).await?;
        self.tracker.pages.save_draft(&page).await?;
        Ok(page)
    }
}
