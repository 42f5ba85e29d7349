pub mod dto;
pub mod handler;
mod helpers;
pub mod service;

pub use dto::{
    AnalysisReportDto, AnalysisRequestDto, LatestAnalysisQuery, SourceStatusDto, TopicFailureDto,
};
pub use handler::{handle_healthcheck, handle_latest_analysis, handle_run_analysis};
pub use service::{ArticleSource, PipelineService};
