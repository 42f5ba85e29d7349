#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use tokio::sync::Mutex;

use news_bias_ai::config::{AppConfig, load_config_from};
use news_bias_ai::core::cache::CacheManager;
use news_bias_ai::core::error::AppError;
use news_bias_ai::features::comparison::{ComparisonService, TextGenerator};
use news_bias_ai::features::news::{Article, Outlet};
use news_bias_ai::features::pipeline::{ArticleSource, PipelineService};

pub const VALID_OUTPUT: &str = r#"{"liberal_summary": ["Bill praised", "Funding framed as overdue"], "conservative_summary": "- Spending questioned", "bias_notes": "CNN stresses relief; Fox stresses cost.", "blind_spots": ["Long-term cost estimates"]}"#;

pub fn test_config(overrides: &[(&str, &str)]) -> AppConfig {
    let mut values: HashMap<String, String> = [
        ("NEWS_API_KEY", "test-news-key"),
        ("GEMINI_API_KEY", "test-gemini-key"),
        ("DISABLE_PROXY", "true"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    for (key, value) in overrides {
        values.insert(key.to_string(), value.to_string());
    }

    load_config_from(|key| values.get(key).cloned()).expect("test config")
}

pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 16, 18, 0, 0).unwrap()
}

pub fn article(outlet: Outlet, title: &str, description: &str, hours_ago: i64) -> Article {
    let slug = title
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-");
    Article {
        title: title.to_string(),
        source: outlet,
        published_at: base_time() - Duration::hours(hours_ago),
        url: format!("https://{}.example/{slug}", outlet.as_str()),
        description: description.to_string(),
        body: None,
    }
}

/// Three stories both outlets covered, then seven each that only one did.
pub fn overlapping_articles() -> (Vec<Article>, Vec<Article>) {
    let shared = [
        (
            "Senate passes border security funding bill",
            "Lawmakers approved border security funding after a marathon session.",
            "Senate passes border security bill after marathon vote",
            "Border security funding bill clears the Senate after marathon session.",
        ),
        (
            "Supreme Court hears tariff challenge from small businesses",
            "Justices weighed whether presidential tariff powers exceed statutory limits.",
            "Supreme Court weighs tariff powers in small business challenge",
            "Justices questioned presidential tariff powers and statutory limits.",
        ),
        (
            "Governor race tightens in Georgia polling",
            "New polling shows the Georgia governor race within two points.",
            "Georgia governor race tightens as polling narrows",
            "Georgia polling shows governor race narrows to two points.",
        ),
    ];

    let liberal_only = [
        ("Mayor unveils downtown transit expansion plan", "City council reviews light rail proposal costs."),
        ("Educators union rallies for classroom funding", "Educators demand smaller class sizes statewide."),
        ("Wildfire smoke prompts health advisories", "Air quality alerts issued across western counties."),
        ("Pharmaceutical pricing hearing scheduled", "Drug makers testify about insulin costs."),
        ("Farm aid package draws rural praise", "Growers welcome drought relief payments."),
        ("Veterans hospital backlog investigated", "Inspectors audit delayed medical appointments."),
        ("Cybersecurity agency warns utilities", "Hackers targeted electric grid operators."),
    ];

    let conservative_only = [
        ("Oil drilling permits expanded offshore", "Energy department approves Gulf leases."),
        ("Campus speech policy sparks lawsuit", "Students sue university over protest rules."),
        ("Police staffing shortage worries sheriffs", "Deputies retire faster than recruits arrive."),
        ("Tax relief proposal targets families", "Child credit increase floated by governors."),
        ("Military recruiting rebounds", "Army exceeds enlistment goals this year."),
        ("Crypto regulation bill stalls", "Digital asset framework faces committee delays."),
        ("Border wall construction resumes", "Contractors restart barrier work near Arizona."),
    ];

    let mut liberal = Vec::new();
    let mut conservative = Vec::new();

    for (index, (lib_title, lib_desc, con_title, con_desc)) in shared.iter().enumerate() {
        let hours = index as i64 * 2;
        liberal.push(article(Outlet::Liberal, lib_title, lib_desc, hours));
        conservative.push(article(Outlet::Conservative, con_title, con_desc, hours + 1));
    }
    for (index, (title, desc)) in liberal_only.iter().enumerate() {
        liberal.push(article(Outlet::Liberal, title, desc, 10 + index as i64));
    }
    for (index, (title, desc)) in conservative_only.iter().enumerate() {
        conservative.push(article(Outlet::Conservative, title, desc, 10 + index as i64));
    }

    (liberal, conservative)
}

pub struct MockArticleSource {
    liberal: Result<Vec<Article>, String>,
    conservative: Result<Vec<Article>, String>,
    bodies: HashMap<String, String>,
    calls: Arc<Mutex<HashMap<Outlet, usize>>>,
    body_requests: Arc<Mutex<Vec<String>>>,
}

impl MockArticleSource {
    pub fn new(
        liberal: Result<Vec<Article>, String>,
        conservative: Result<Vec<Article>, String>,
    ) -> Self {
        Self {
            liberal,
            conservative,
            bodies: HashMap::new(),
            calls: Arc::new(Mutex::new(HashMap::new())),
            body_requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_body(mut self, url: &str, body: &str) -> Self {
        self.bodies.insert(url.to_string(), body.to_string());
        self
    }

    pub async fn body_requests(&self) -> Vec<String> {
        self.body_requests.lock().await.clone()
    }

    pub async fn count_for(&self, outlet: Outlet) -> usize {
        let guard = self.calls.lock().await;
        guard.get(&outlet).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ArticleSource for MockArticleSource {
    async fn fetch_articles(
        &self,
        outlet: Outlet,
        _lookback_hours: u32,
    ) -> Result<Vec<Article>, AppError> {
        *self.calls.lock().await.entry(outlet).or_insert(0) += 1;
        let result = match outlet {
            Outlet::Liberal => &self.liberal,
            Outlet::Conservative => &self.conservative,
        };
        result.clone().map_err(AppError::fetch)
    }

    async fn fetch_body(&self, article: &Article) -> Option<String> {
        self.body_requests.lock().await.push(article.url.clone());
        self.bodies.get(&article.url).cloned()
    }
}

pub struct MockGenerator {
    response: String,
    fail_when_prompt_contains: Option<String>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockGenerator {
    pub fn new(response: &str) -> Self {
        Self {
            response: response.to_string(),
            fail_when_prompt_contains: None,
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn failing_on(mut self, marker: &str) -> Self {
        self.fail_when_prompt_contains = Some(marker.to_string());
        self
    }

    pub async fn prompts(&self) -> Vec<String> {
        self.prompts.lock().await.clone()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, AppError> {
        self.prompts.lock().await.push(prompt.to_string());
        if let Some(marker) = &self.fail_when_prompt_contains {
            if prompt.contains(marker.as_str()) {
                return Err(AppError::generation("rate limited (429 Too Many Requests)".to_string()));
            }
        }
        Ok(self.response.clone())
    }
}

pub fn build_pipeline(
    config: AppConfig,
    source: Arc<MockArticleSource>,
    generator: Arc<MockGenerator>,
) -> PipelineService {
    let config = Arc::new(config);
    let comparison = Arc::new(ComparisonService::new(&config, generator).expect("comparison service"));
    let cache = CacheManager::new(config.cache_enabled, 16);
    PipelineService::new(config, source, comparison, cache)
}
