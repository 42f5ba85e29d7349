use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outlet {
    Liberal,
    Conservative,
}

impl Outlet {
    pub const ALL: [Outlet; 2] = [Outlet::Liberal, Outlet::Conservative];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Liberal => "liberal",
            Self::Conservative => "conservative",
        }
    }

    pub fn other(&self) -> Outlet {
        match self {
            Self::Liberal => Self::Conservative,
            Self::Conservative => Self::Liberal,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub source: Outlet,
    pub published_at: DateTime<Utc>,
    pub url: String,
    pub description: String,
    /// Paragraph text scraped from `url`, when it could be fetched. Only
    /// feeds the comparison prompt, never the report.
    #[serde(skip)]
    pub body: Option<String>,
}

/// `GET /v2/everything` response body.
#[derive(Debug, Deserialize)]
pub struct NewsApiResponse {
    pub status: String,
    #[serde(rename = "totalResults", default)]
    pub total_results: u64,
    #[serde(default)]
    pub articles: Vec<NewsApiArticle>,
    pub code: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewsApiArticle {
    pub source: Option<NewsApiSource>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    #[serde(rename = "publishedAt")]
    pub published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct NewsApiSource {
    pub id: Option<String>,
    pub name: Option<String>,
}
