use std::env;
use std::str::FromStr;

use chrono_tz::Tz;

use crate::config::dto::{AppConfig, CacheTtlConfig, SourceConfig};
use crate::core::error::AppError;

pub const MAX_TOPICS_CAP: usize = 5;
pub const MAX_LOOKBACK_HOURS: u32 = 72;
const MAX_PAGE_SIZE: u32 = 100;
const MIN_PROMPT_CHARS: usize = 1000;
const MAX_CONCURRENCY_CAP: usize = 16;
const MIN_ARTICLE_BODY_CHARS: usize = 200;

pub fn load_config() -> Result<AppConfig, AppError> {
    dotenvy::dotenv().ok();
    load_config_from(|key| env::var(key).ok())
}

/// Builds the configuration from an arbitrary key lookup so it can be
/// exercised without touching the process environment.
pub fn load_config_from<F>(lookup: F) -> Result<AppConfig, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    let news_api_key = required(&lookup, "NEWS_API_KEY")?;
    let gemini_api_key = required(&lookup, "GEMINI_API_KEY")?;

    let port = parse_env(&lookup, "PORT", 4100u16)?;

    let news_api_base = string_env(&lookup, "NEWS_API_BASE", "https://newsapi.org/v2");
    let gemini_api_base = string_env(
        &lookup,
        "GEMINI_API_BASE",
        "https://generativelanguage.googleapis.com/v1beta",
    );
    let gemini_model = string_env(&lookup, "GEMINI_MODEL", "gemini-1.5-flash");

    let liberal = SourceConfig {
        name: string_env(&lookup, "LIBERAL_SOURCE", "CNN"),
        domain: string_env(&lookup, "LIBERAL_DOMAIN", "cnn.com"),
    };
    let conservative = SourceConfig {
        name: string_env(&lookup, "CONSERVATIVE_SOURCE", "Fox News"),
        domain: string_env(&lookup, "CONSERVATIVE_DOMAIN", "foxnews.com"),
    };
    if liberal.domain.eq_ignore_ascii_case(&conservative.domain) {
        return Err(AppError::configuration(format!(
            "liberal and conservative sources must differ, both are {}",
            liberal.domain
        )));
    }

    let lookback_hours = parse_env(&lookup, "LOOKBACK_HOURS", 24u32)?;
    if lookback_hours == 0 || lookback_hours > MAX_LOOKBACK_HOURS {
        return Err(AppError::configuration(format!(
            "LOOKBACK_HOURS must be between 1 and {MAX_LOOKBACK_HOURS}, got {lookback_hours}"
        )));
    }

    let page_size = parse_env(&lookup, "PAGE_SIZE", 50u32)?;
    if page_size == 0 || page_size > MAX_PAGE_SIZE {
        return Err(AppError::configuration(format!(
            "PAGE_SIZE must be between 1 and {MAX_PAGE_SIZE}, got {page_size}"
        )));
    }

    let max_topics = parse_env(&lookup, "MAX_TOPICS", MAX_TOPICS_CAP)?;
    if max_topics == 0 {
        return Err(AppError::configuration("MAX_TOPICS must be positive".to_string()));
    }
    let max_topics = max_topics.min(MAX_TOPICS_CAP);

    let similarity_threshold = parse_env(&lookup, "SIMILARITY_THRESHOLD", 0.2f32)?;
    if !(similarity_threshold > 0.0 && similarity_threshold <= 1.0) {
        return Err(AppError::configuration(format!(
            "SIMILARITY_THRESHOLD must be in (0, 1], got {similarity_threshold}"
        )));
    }

    let max_prompt_chars = parse_env(&lookup, "MAX_PROMPT_CHARS", 8000usize)?;
    if max_prompt_chars < MIN_PROMPT_CHARS {
        return Err(AppError::configuration(format!(
            "MAX_PROMPT_CHARS must be at least {MIN_PROMPT_CHARS}, got {max_prompt_chars}"
        )));
    }

    let max_concurrency = parse_env(&lookup, "MAX_CONCURRENCY", 5usize)?.clamp(1, MAX_CONCURRENCY_CAP);

    let article_body_chars = parse_env(&lookup, "ARTICLE_BODY_CHARS", 2000usize)?;
    if article_body_chars < MIN_ARTICLE_BODY_CHARS {
        return Err(AppError::configuration(format!(
            "ARTICLE_BODY_CHARS must be at least {MIN_ARTICLE_BODY_CHARS}, got {article_body_chars}"
        )));
    }

    let timezone_name = string_env(&lookup, "DASHBOARD_TIMEZONE", "America/New_York");
    let timezone = timezone_name.parse::<Tz>().map_err(|err| {
        AppError::configuration(format!("invalid DASHBOARD_TIMEZONE {timezone_name}: {err}"))
    })?;

    Ok(AppConfig {
        port,
        news_api_key,
        gemini_api_key,
        news_api_base: news_api_base.trim_end_matches('/').to_string(),
        gemini_api_base: gemini_api_base.trim_end_matches('/').to_string(),
        gemini_model,
        liberal,
        conservative,
        lookback_hours,
        page_size,
        max_topics,
        similarity_threshold,
        max_prompt_chars,
        max_concurrency,
        fetch_article_bodies: parse_bool_env(&lookup, "FETCH_ARTICLE_BODIES", true),
        article_body_chars,
        news_timeout_secs: parse_env(&lookup, "NEWS_TIMEOUT_SECS", 10u64)?,
        generation_timeout_secs: parse_env(&lookup, "GENERATION_TIMEOUT_SECS", 60u64)?,
        disable_proxy: parse_bool_env(&lookup, "DISABLE_PROXY", false),
        cache_enabled: parse_bool_env(&lookup, "CACHE_ENABLED", true),
        cache_ttl: CacheTtlConfig {
            articles: parse_env(&lookup, "CACHE_TTL_ARTICLES", 3600u64)?,
            report: parse_env(&lookup, "CACHE_TTL_REPORT", 900u64)?,
        },
        timezone,
    })
}

fn required<F>(lookup: &F, key: &str) -> Result<String, AppError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::configuration(format!("{key} is required")))
}

fn string_env<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key).map(|value| value.trim().to_string()) {
        Some(value) if !value.is_empty() => value
            .parse::<T>()
            .map_err(|err| AppError::configuration(format!("invalid {key}: {err}"))),
        _ => Ok(default),
    }
}

fn parse_bool_env<F>(lookup: &F, key: &str, default: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| matches!(value.trim(), "true" | "1" | "TRUE" | "True"))
        .unwrap_or(default)
}
