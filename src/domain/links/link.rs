use serde::{Deserialize, Serialize};

/// The two persisted relations a page keeps for the links found in its fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingRelation {
    /// page -> page
    LinkTracking,
    /// page -> file; owned by the page
    ImageTracking,
}

impl TrackingRelation {
    pub const ALL: [TrackingRelation; 2] =
        [TrackingRelation::LinkTracking, TrackingRelation::ImageTracking];

    pub fn table_name(&self) -> &'static str {
        match self {
            TrackingRelation::LinkTracking => "page_link_tracking",
            TrackingRelation::ImageTracking => "page_image_tracking",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackingEdge {
    pub owner_id: i64,
    pub target_id: i64,
    pub field_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BacklinkInfo {
    pub page_id: i64,
    pub title: String,
    pub field_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingLink {
    pub relation: TrackingRelation,
    pub target_id: i64,
    pub field_name: String,
}
