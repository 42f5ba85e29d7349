use serde::{Deserialize, Serialize};

use crate::features::news::Outlet;
use crate::features::topics::Topic;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub topic: Topic,
    pub liberal_summary: String,
    pub conservative_summary: String,
    pub bias_notes: String,
    /// Missing context, opposing views and unanswered questions across both
    /// outlets' coverage.
    pub blind_spots: String,
    /// Set when this outlet could not be fetched and the analysis covers
    /// the other outlet alone; its summary then says so.
    #[serde(default)]
    pub unavailable_outlet: Option<Outlet>,
}
