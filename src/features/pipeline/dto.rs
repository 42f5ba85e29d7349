use serde::{Deserialize, Serialize};

use crate::features::comparison::ComparisonResult;
use crate::features::news::{Article, Outlet};
use crate::features::utilities::ReportTimestampDto;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisRequestDto {
    /// Ignore any cached report and run the pipeline again.
    #[serde(default)]
    pub refresh: bool,
    #[serde(default)]
    pub lookback_hours: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LatestAnalysisQuery {
    #[serde(default)]
    pub lookback_hours: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReportDto {
    #[serde(flatten)]
    pub timestamp: ReportTimestampDto,
    pub lookback_hours: u32,
    pub sources: Vec<SourceStatusDto>,
    pub articles: Vec<Article>,
    pub comparisons: Vec<ComparisonResult>,
    pub failures: Vec<TopicFailureDto>,
    #[serde(default)]
    pub advisories: Vec<String>,
    #[serde(default)]
    pub cached: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceStatusDto {
    pub outlet: Outlet,
    pub name: String,
    pub domain: String,
    pub article_count: usize,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicFailureDto {
    pub topic: String,
    pub error: String,
}
