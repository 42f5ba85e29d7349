use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Timelike, Utc};
use reqwest::Url;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::core::cache::CacheManager;
use crate::core::error::AppError;
use crate::core::http_client::{RequestFailure, build_http_client, send_with_retry};
use crate::features::news::dto::{Article, NewsApiResponse, Outlet};
use crate::features::news::helpers::{
    describe_api_error, extract_paragraphs, is_political, normalise_articles,
};

const API_KEY_HEADER: &str = "X-Api-Key";

pub struct NewsApiClient {
    config: Arc<AppConfig>,
    cache: CacheManager,
    http_client: reqwest::Client,
}

impl NewsApiClient {
    pub fn new(config: Arc<AppConfig>, cache: CacheManager) -> Result<Self, AppError> {
        let http_client = build_http_client(
            config.disable_proxy,
            Duration::from_secs(config.news_timeout_secs),
        )
        .map_err(|err| AppError::internal(format!("failed to build HTTP client: {err}")))?;

        Ok(Self {
            config,
            cache,
            http_client,
        })
    }

    /// Political articles published by `outlet` within the last
    /// `lookback_hours`, newest first.
    pub async fn fetch_articles(
        &self,
        outlet: Outlet,
        lookback_hours: u32,
    ) -> Result<Vec<Article>, AppError> {
        let source = self.config.source(outlet);

        let domain_url = self.everything_url(lookback_hours, ("domains", source.domain.clone()))?;
        let mut response = self.execute_query(domain_url).await?;

        if response.articles.is_empty() {
            debug!(target: "fetcher", source = %source.name, "domain search empty, trying site query");
            let site_url =
                self.everything_url(lookback_hours, ("q", format!("site:{}", source.domain)))?;
            response = self.execute_query(site_url).await?;
        }

        let total_results = response.total_results;
        let fetched = normalise_articles(response.articles, outlet);
        let fetched_count = fetched.len();
        let political: Vec<Article> = fetched.into_iter().filter(is_political).collect();

        info!(
            target: "fetcher",
            source = %source.name,
            total_results,
            fetched = fetched_count,
            political = political.len(),
            "fetched articles"
        );

        Ok(political)
    }

    /// Paragraph text of the article's own page. `None` when the page cannot
    /// be fetched or holds no substantial paragraphs; callers then work from
    /// the title and description alone.
    pub async fn fetch_body(&self, article: &Article) -> Option<String> {
        let cache_key = format!("body:{}", article.url);
        if let Some(serde_json::Value::String(cached)) = self.cache.get(&cache_key).await {
            return Some(cached);
        }

        let response = match self.http_client.get(&article.url).send().await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                warn!(target: "fetcher", url = %article.url, status = %response.status(), "article page unavailable");
                return None;
            }
            Err(error) => {
                warn!(target: "fetcher", url = %article.url, %error, "article page unreachable");
                return None;
            }
        };

        let html = match response.text().await {
            Ok(html) => html,
            Err(error) => {
                warn!(target: "fetcher", url = %article.url, %error, "article page unreadable");
                return None;
            }
        };

        let body = extract_paragraphs(&html, self.config.article_body_chars)?;
        debug!(target: "fetcher", url = %article.url, chars = body.chars().count(), "article body extracted");

        self.cache
            .insert(
                cache_key,
                serde_json::Value::String(body.clone()),
                self.config.cache_ttl.articles,
            )
            .await;

        Some(body)
    }

    fn everything_url(
        &self,
        lookback_hours: u32,
        (filter_key, filter_value): (&str, String),
    ) -> Result<Url, AppError> {
        let mut url = Url::parse(&format!("{}/everything", self.config.news_api_base))
            .map_err(|err| AppError::internal(format!("invalid news api url: {err}")))?;

        // Hour granularity keeps the URL, and so the cache key, stable within an hour.
        let from = Utc::now() - ChronoDuration::hours(i64::from(lookback_hours));
        let from = from
            .with_minute(0)
            .and_then(|value| value.with_second(0))
            .unwrap_or(from);

        url.query_pairs_mut()
            .append_pair(filter_key, &filter_value)
            .append_pair("language", "en")
            .append_pair("sortBy", "publishedAt")
            .append_pair("from", &from.format("%Y-%m-%dT%H:%M:%S").to_string())
            .append_pair("pageSize", &self.config.page_size.to_string());

        Ok(url)
    }

    async fn execute_query(&self, url: Url) -> Result<NewsApiResponse, AppError> {
        let cache_key = format!("news:{url}");
        if let Some(cached) = self.cache.get(&cache_key).await {
            if let Ok(response) = serde_json::from_value::<NewsApiResponse>(cached) {
                return Ok(response);
            }
        }

        let text = send_with_retry("newsapi", || {
            self.http_client
                .get(url.clone())
                .header(API_KEY_HEADER, &self.config.news_api_key)
        })
        .await
        .map_err(|failure| fetch_failure(&url, failure))?;

        let value: serde_json::Value = serde_json::from_str(&text)
            .map_err(|err| AppError::fetch(format!("news api returned invalid json: {err}")))?;
        let response: NewsApiResponse = serde_json::from_value(value.clone())
            .map_err(|err| AppError::fetch(format!("unexpected news api response: {err}")))?;

        if response.status != "ok" {
            return Err(AppError::fetch(format!(
                "news api reported {}: {}",
                response.status,
                response.message.as_deref().unwrap_or("no message")
            )));
        }

        self.cache
            .insert(cache_key, value, self.config.cache_ttl.articles)
            .await;

        Ok(response)
    }
}

fn fetch_failure(url: &Url, failure: RequestFailure) -> AppError {
    let host = url.host_str().unwrap_or("news api");
    match (failure.status(), failure.body()) {
        (Some(status), Some(body)) => AppError::fetch(format!(
            "request to {host} failed with {status}: {}",
            describe_api_error(body)
        )),
        _ => AppError::fetch(format!("could not reach {host}: {failure}")),
    }
}
