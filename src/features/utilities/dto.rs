use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTimestampDto {
    /// RFC 3339, UTC.
    pub generated_at: String,
    /// Long-form date in the dashboard's timezone, e.g. "Saturday, October 17, 2026".
    pub display_date: String,
}
