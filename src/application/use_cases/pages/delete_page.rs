use crate::application::linktracking::LinkTracker;
use crate::application::ports::files_repository::FilesRepository;
use crate::application::ports::link_tracking_repository::LinkTrackingRepository;
use crate::application::ports::page_repository::PageRepository;
use crate::application::ports::url_normalizer::UrlNormalizer;
use crate::application::use_cases::pages::resync_dependents::{DependencyTarget, ResyncDependents};

pub struct DeletePage<'a, P, F, L, U>
where
    P: PageRepository + ?Sized,
    F: FilesRepository + ?Sized,
    L: LinkTrackingRepository + ?Sized,
    U: UrlNormalizer + ?Sized,
{
    pub tracker: &'a LinkTracker<'a, P, F, L, U>,
}

impl<'a, P, F, L, U> DeletePage<'a, P, F, L, U>
where
    P: PageRepository + ?Sized,
    F: FilesRepository + ?Sized,
    L: LinkTrackingRepository + ?Sized,
    U: UrlNormalizer + ?Sized,
{
    // Returns false if the page did not exist
    pub async fn execute(&self, id: i64) -> anyhow::Result<bool> {
        if !self.tracker.pages.delete_draft(id).await? {
            return Ok(false);
        }
        self.tracker.tracking.clear_owner(id).await?;
        let resync = ResyncDependents {
            tracker: self.tracker,
        };
        resync.execute(DependencyTarget::Page(id)).await?;
        Ok(true)
    }
}
