use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::features::utilities::dto::ReportTimestampDto;

pub struct DateTimeService {
    timezone: Tz,
}

impl DateTimeService {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone }
    }

    pub fn report_timestamp(&self) -> ReportTimestampDto {
        self.timestamp_at(Utc::now())
    }

    pub fn timestamp_at(&self, instant: DateTime<Utc>) -> ReportTimestampDto {
        let local = instant.with_timezone(&self.timezone);

        ReportTimestampDto {
            generated_at: instant.to_rfc3339(),
            display_date: local.format("%A, %B %-d, %Y").to_string(),
        }
    }
}
