use crate::application::ports::link_tracking_repository::LinkTrackingRepository;
use crate::domain::links::link::{BacklinkInfo, TrackingRelation};

pub struct GetBacklinks<'a, L: LinkTrackingRepository + ?Sized> {
    pub tracking: &'a L,
}

impl<'a, L: LinkTrackingRepository + ?Sized> GetBacklinks<'a, L> {
    pub async fn execute(&self, page_id: i64) -> anyhow::Result<Vec<BacklinkInfo>> {
        self.tracking
            .backlinks_for(TrackingRelation::LinkTracking, page_id)
            .await
    }
}
