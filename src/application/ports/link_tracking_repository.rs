use async_trait::async_trait;

use crate::domain::links::link::{BacklinkInfo, TrackingEdge, TrackingRelation};

#[async_trait]
pub trait LinkTrackingRepository: Send + Sync {
    async fn list_edges(
        &self,
        relation: TrackingRelation,
        owner_id: i64,
    ) -> anyhow::Result<Vec<TrackingEdge>>;

    /// Drops every edge of `owner_id` tagged with `field_name` and inserts one per target,
    /// as a single atomic batch.
    async fn replace_field_edges(
        &self,
        relation: TrackingRelation,
        owner_id: i64,
        field_name: &str,
        targets: &[i64],
    ) -> anyhow::Result<()>;

    /// Removes all edges owned by the page, in both relations.
    async fn clear_owner(&self, owner_id: i64) -> anyhow::Result<()>;

    async fn owners_linking_to(
        &self,
        relation: TrackingRelation,
        target_id: i64,
    ) -> anyhow::Result<Vec<i64>>;

    async fn backlinks_for(
        &self,
        relation: TrackingRelation,
        target_id: i64,
    ) -> anyhow::Result<Vec<BacklinkInfo>>;
}
