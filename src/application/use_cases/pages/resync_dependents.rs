use std::collections::BTreeSet;

use crate::application::linktracking::LinkTracker;
use crate::application::ports::files_repository::FilesRepository;
use crate::application::ports::link_tracking_repository::LinkTrackingRepository;
use crate::application::ports::page_repository::PageRepository;
use crate::application::ports::url_normalizer::UrlNormalizer;
use crate::domain::links::link::TrackingRelation;
use crate::domain::pages::page::Stage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyTarget {
    Page(i64),
    File(i64),
}

/// Rescans the pages that depend on a page or file after it was deleted, restored or replaced.
///
/// Dependents are the pages holding a tracking edge to the target plus every page already flagged
/// with the matching broken flag: a broken reference never becomes an edge, so those pages could
/// only be found by rescanning them.
pub struct ResyncDependents<'a, P, F, L, U>
where
    P: PageRepository + ?Sized,
    F: FilesRepository + ?Sized,
    L: LinkTrackingRepository + ?Sized,
    U: UrlNormalizer + ?Sized,
{
    pub tracker: &'a LinkTracker<'a, P, F, L, U>,
}

impl<'a, P, F, L, U> ResyncDependents<'a, P, F, L, U>
where
    P: PageRepository + ?Sized,
    F: FilesRepository + ?Sized,
    L: LinkTrackingRepository + ?Sized,
    U: UrlNormalizer + ?Sized,
{
    /// Returns the ids of the pages that were rescanned.
    pub async fn execute(&self, target: DependencyTarget) -> anyhow::Result<Vec<i64>> {
        let (relation, target_id) = match target {
            DependencyTarget::Page(id) => (TrackingRelation::LinkTracking, id),
            DependencyTarget::File(id) => (TrackingRelation::ImageTracking, id),
        };
        let mut dependents: BTreeSet<i64> = self
            .tracker
            .tracking
            .owners_linking_to(relation, target_id)
            .await?
            .into_iter()
            .collect();
        for page in self.tracker.pages.list_broken().await? {
            let flagged = match target {
                DependencyTarget::Page(_) => page.has_broken_link,
                DependencyTarget::File(_) => page.has_broken_file,
            };
            if let (true, Some(id)) = (flagged, page.id) {
                dependents.insert(id);
            }
        }

        let mut resynced = Vec::new();
        for id in dependents {
            let Some(mut page) = self.tracker.pages.get_draft(id).await? else {
                continue;
            };
            self.tracker.synchronize(&mut page, Stage::Draft).await?;
            self.tracker.pages.save_draft(&page).await?;
            resynced.push(id);
        }
        tracing::info!(?target, pages = resynced.len(), "dependents_resynced");
        Ok(resynced)
    }
}
