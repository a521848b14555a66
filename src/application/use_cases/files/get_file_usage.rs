use crate::application::ports::link_tracking_repository::LinkTrackingRepository;
use crate::domain::links::link::{BacklinkInfo, TrackingRelation};

/// Pages whose HTML fields embed or link to a file.
pub struct GetFileUsage<'a, L: LinkTrackingRepository + ?Sized> {
    pub tracking: &'a L,
}

impl<'a, L: LinkTrackingRepository + ?Sized> GetFileUsage<'a, L> {
    pub async fn execute(&self, file_id: i64) -> anyhow::Result<Vec<BacklinkInfo>> {
        self.tracking
            .backlinks_for(TrackingRelation::ImageTracking, file_id)
            .await
    }
}
