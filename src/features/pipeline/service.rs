use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::core::cache::CacheManager;
use crate::core::error::AppError;
use crate::features::comparison::{ComparisonResult, ComparisonService};
use crate::features::news::{Article, NewsApiClient, Outlet};
use crate::features::pipeline::dto::{
    AnalysisReportDto, AnalysisRequestDto, SourceStatusDto, TopicFailureDto,
};
use crate::features::pipeline::helpers::{coerce_lookback, report_cache_key};
use crate::features::topics::{Topic, TopicSelector};
use crate::features::utilities::DateTimeService;

/// Newest articles per side whose pages are fetched for a topic.
const BODY_ARTICLES_PER_SIDE: usize = 3;

#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_articles(
        &self,
        outlet: Outlet,
        lookback_hours: u32,
    ) -> Result<Vec<Article>, AppError>;

    /// Page text for `article`; `None` leaves the title and description to
    /// stand in for it.
    async fn fetch_body(&self, _article: &Article) -> Option<String> {
        None
    }
}

#[async_trait]
impl ArticleSource for NewsApiClient {
    async fn fetch_articles(
        &self,
        outlet: Outlet,
        lookback_hours: u32,
    ) -> Result<Vec<Article>, AppError> {
        NewsApiClient::fetch_articles(self, outlet, lookback_hours).await
    }

    async fn fetch_body(&self, article: &Article) -> Option<String> {
        NewsApiClient::fetch_body(self, article).await
    }
}

/// Fetch, select, compare. Runs only when asked to. The latest report per
/// lookback window is kept for the session and reused until it expires.
pub struct PipelineService {
    config: Arc<AppConfig>,
    source: Arc<dyn ArticleSource>,
    selector: TopicSelector,
    comparison: Arc<ComparisonService>,
    cache: CacheManager,
    latest: RwLock<HashMap<u32, AnalysisReportDto>>,
    clock: DateTimeService,
}

impl PipelineService {
    pub fn new(
        config: Arc<AppConfig>,
        source: Arc<dyn ArticleSource>,
        comparison: Arc<ComparisonService>,
        cache: CacheManager,
    ) -> Self {
        Self {
            selector: TopicSelector::from_config(&config),
            clock: DateTimeService::new(config.timezone),
            latest: RwLock::new(HashMap::new()),
            config,
            source,
            comparison,
            cache,
        }
    }

    pub async fn run_analysis(
        &self,
        request: AnalysisRequestDto,
    ) -> Result<AnalysisReportDto, AppError> {
        let lookback_hours = coerce_lookback(request.lookback_hours, self.config.lookback_hours)?;
        let cache_key = report_cache_key(lookback_hours);

        if !request.refresh {
            if let Some(mut cached) = self.cache.get_json::<AnalysisReportDto>(&cache_key).await {
                cached.cached = true;
                return Ok(cached);
            }
        }

        let timestamp = self.clock.report_timestamp();
        let mut advisories = Vec::new();

        let (sources, articles) = self.fetch_all(lookback_hours, &mut advisories).await?;
        let single_outlet = surviving_outlet(&sources);

        let mut topics = match single_outlet {
            Some(outlet) => {
                let available = self.config.source(outlet);
                let missing = self.config.source(outlet.other());
                advisories.push(format!(
                    "{} has no coverage in this run, so stories are analysed from {} alone",
                    missing.name, available.name
                ));
                self.selector.select_single_outlet(&articles)
            }
            None => self.selector.select(&articles),
        };

        if topics.len() < self.selector.max_topics() {
            let shortfall = AppError::selection(match single_outlet {
                Some(outlet) => format!(
                    "found {} of {} requested topics from {}",
                    topics.len(),
                    self.selector.max_topics(),
                    self.config.source(outlet).name
                ),
                None => format!(
                    "found {} of {} requested topics covered by both outlets",
                    topics.len(),
                    self.selector.max_topics()
                ),
            });
            warn!(target: "pipeline", %shortfall, "topic shortfall");
            advisories.push(shortfall.to_string());
        }

        if self.config.fetch_article_bodies {
            self.attach_bodies(&mut topics).await;
        }

        let (comparisons, failures) = self.compare_all(&topics, single_outlet.is_some()).await;

        info!(
            target: "pipeline",
            lookback_hours,
            articles = articles.len(),
            topics = topics.len(),
            single_outlet = single_outlet.map(|outlet| outlet.as_str()),
            comparisons = comparisons.len(),
            failures = failures.len(),
            "analysis complete"
        );

        let report = AnalysisReportDto {
            timestamp,
            lookback_hours,
            sources,
            articles,
            comparisons,
            failures,
            advisories,
            cached: false,
        };

        self.cache
            .insert_json(cache_key, &report, self.config.cache_ttl.report)
            .await;
        self.latest
            .write()
            .await
            .insert(lookback_hours, report.clone());

        Ok(report)
    }

    /// The most recent report for the lookback window run this session.
    pub async fn latest_report(
        &self,
        lookback_hours: Option<u32>,
    ) -> Result<AnalysisReportDto, AppError> {
        let lookback_hours = coerce_lookback(lookback_hours, self.config.lookback_hours)?;
        let mut report = self
            .latest
            .read()
            .await
            .get(&lookback_hours)
            .cloned()
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "no analysis for the last {lookback_hours} hours yet; run one first"
                ))
            })?;
        report.cached = true;
        Ok(report)
    }

    async fn fetch_all(
        &self,
        lookback_hours: u32,
        advisories: &mut Vec<String>,
    ) -> Result<(Vec<SourceStatusDto>, Vec<Article>), AppError> {
        let (liberal, conservative) = tokio::join!(
            self.source.fetch_articles(Outlet::Liberal, lookback_hours),
            self.source.fetch_articles(Outlet::Conservative, lookback_hours),
        );

        let mut sources = Vec::with_capacity(2);
        let mut articles = Vec::new();
        let mut errors = Vec::new();

        for (outlet, result) in [(Outlet::Liberal, liberal), (Outlet::Conservative, conservative)] {
            let source = self.config.source(outlet);
            match result {
                Ok(fetched) => {
                    if fetched.is_empty() {
                        warn!(target: "pipeline", source = %source.name, "no political articles");
                        advisories.push(format!(
                            "{} returned no political articles in the last {lookback_hours} hours",
                            source.name
                        ));
                    }
                    sources.push(SourceStatusDto {
                        outlet,
                        name: source.name.clone(),
                        domain: source.domain.clone(),
                        article_count: fetched.len(),
                        error: None,
                    });
                    articles.extend(fetched);
                }
                Err(error) => {
                    warn!(target: "pipeline", %error, source = %source.name, "source unavailable");
                    advisories.push(format!(
                        "{} is unavailable, showing degraded results: {error}",
                        source.name
                    ));
                    errors.push(format!("{}: {error}", source.name));
                    sources.push(SourceStatusDto {
                        outlet,
                        name: source.name.clone(),
                        domain: source.domain.clone(),
                        article_count: 0,
                        error: Some(error.to_string()),
                    });
                }
            }
        }

        if errors.len() == Outlet::ALL.len() {
            return Err(AppError::fetch(format!(
                "no news source could be reached ({})",
                errors.join("; ")
            )));
        }

        Ok((sources, articles))
    }

    /// Fills in page text for the newest articles of each selected topic.
    /// Articles whose page cannot be fetched keep `body: None`.
    async fn attach_bodies(&self, topics: &mut [Topic]) {
        let pending: Vec<_> = topics
            .iter()
            .flat_map(|topic| {
                topic
                    .liberal_articles
                    .iter()
                    .take(BODY_ARTICLES_PER_SIDE)
                    .chain(topic.conservative_articles.iter().take(BODY_ARTICLES_PER_SIDE))
            })
            .map(|article| self.source.fetch_body(article))
            .collect();
        let requested = pending.len();
        let bodies: Vec<Option<String>> = stream::iter(pending)
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let mut bodies = bodies.into_iter();
        for topic in topics.iter_mut() {
            for article in topic
                .liberal_articles
                .iter_mut()
                .take(BODY_ARTICLES_PER_SIDE)
                .chain(topic.conservative_articles.iter_mut().take(BODY_ARTICLES_PER_SIDE))
            {
                article.body = bodies.next().flatten();
            }
        }

        let fetched = topics
            .iter()
            .flat_map(|topic| topic.liberal_articles.iter().chain(&topic.conservative_articles))
            .filter(|article| article.body.is_some())
            .count();
        info!(target: "pipeline", requested, fetched, "article pages fetched");
    }

    /// Topic order is preserved; a failure only affects its own topic.
    async fn compare_all(
        &self,
        topics: &[Topic],
        single_outlet: bool,
    ) -> (Vec<ComparisonResult>, Vec<TopicFailureDto>) {
        let pending: Vec<_> = topics
            .iter()
            .map(|topic| self.compare_one(topic, single_outlet))
            .collect();
        let outcomes: Vec<(String, Result<ComparisonResult, AppError>)> = stream::iter(pending)
            .buffered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let mut comparisons = Vec::new();
        let mut failures = Vec::new();
        for (label, outcome) in outcomes {
            match outcome {
                Ok(result) => comparisons.push(result),
                Err(error) => failures.push(TopicFailureDto {
                    topic: label,
                    error: error.to_string(),
                }),
            }
        }

        (comparisons, failures)
    }

    async fn compare_one(
        &self,
        topic: &Topic,
        single_outlet: bool,
    ) -> (String, Result<ComparisonResult, AppError>) {
        let outcome = if single_outlet {
            self.comparison.analyze_single_outlet(topic).await
        } else {
            self.comparison.compare(topic).await
        };
        (topic.label.clone(), outcome)
    }
}

/// The only outlet that produced articles, when the other produced none.
fn surviving_outlet(sources: &[SourceStatusDto]) -> Option<Outlet> {
    let mut with_articles = sources.iter().filter(|status| status.article_count > 0);
    match (with_articles.next(), with_articles.next()) {
        (Some(status), None) => Some(status.outlet),
        _ => None,
    }
}
