use crate::application::ports::link_tracking_repository::LinkTrackingRepository;
use crate::domain::links::link::{OutgoingLink, TrackingRelation};

pub struct GetOutgoingLinks<'a, L: LinkTrackingRepository + ?Sized> {
    pub tracking: &'a L,
}

impl<'a, L: LinkTrackingRepository + ?Sized> GetOutgoingLinks<'a, L> {
    pub async fn execute(&self, page_id: i64) -> anyhow::Result<Vec<OutgoingLink>> {
        let mut out = Vec::new();
        for relation in TrackingRelation::ALL {
            for edge in self.tracking.list_edges(relation, page_id).await? {
                out.push(OutgoingLink {
                    relation,
                    target_id: edge.target_id,
                    field_name: edge.field_name,
                });
            }
        }
        Ok(out)
    }
}
