use std::fmt;

use chrono_tz::Tz;

use crate::features::news::Outlet;

#[derive(Clone)]
pub struct AppConfig {
    pub port: u16,
    pub news_api_key: String,
    pub gemini_api_key: String,
    pub news_api_base: String,
    pub gemini_api_base: String,
    pub gemini_model: String,
    pub liberal: SourceConfig,
    pub conservative: SourceConfig,
    pub lookback_hours: u32,
    pub page_size: u32,
    pub max_topics: usize,
    pub similarity_threshold: f32,
    pub max_prompt_chars: usize,
    pub max_concurrency: usize,
    /// Download each selected article's page for its paragraph text.
    pub fetch_article_bodies: bool,
    pub article_body_chars: usize,
    pub news_timeout_secs: u64,
    pub generation_timeout_secs: u64,
    pub disable_proxy: bool,
    pub cache_enabled: bool,
    pub cache_ttl: CacheTtlConfig,
    pub timezone: Tz,
}

impl AppConfig {
    pub fn source(&self, outlet: Outlet) -> &SourceConfig {
        match outlet {
            Outlet::Liberal => &self.liberal,
            Outlet::Conservative => &self.conservative,
        }
    }
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("news_api_key", &"<redacted>")
            .field("gemini_api_key", &"<redacted>")
            .field("news_api_base", &self.news_api_base)
            .field("gemini_api_base", &self.gemini_api_base)
            .field("gemini_model", &self.gemini_model)
            .field("liberal", &self.liberal)
            .field("conservative", &self.conservative)
            .field("lookback_hours", &self.lookback_hours)
            .field("page_size", &self.page_size)
            .field("max_topics", &self.max_topics)
            .field("similarity_threshold", &self.similarity_threshold)
            .field("max_prompt_chars", &self.max_prompt_chars)
            .field("max_concurrency", &self.max_concurrency)
            .field("fetch_article_bodies", &self.fetch_article_bodies)
            .field("article_body_chars", &self.article_body_chars)
            .field("cache_enabled", &self.cache_enabled)
            .field("timezone", &self.timezone)
            .finish()
    }
}

/// A news outlet as NewsAPI knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub name: String,
    pub domain: String,
}

#[derive(Debug, Clone)]
pub struct CacheTtlConfig {
    pub articles: u64,
    pub report: u64,
}
