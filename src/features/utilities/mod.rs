pub mod dto;
pub mod time_service;

pub use dto::ReportTimestampDto;
pub use time_service::DateTimeService;
