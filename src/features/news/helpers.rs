use std::collections::HashSet;

use chrono::{DateTime, Utc};
use scraper::{ElementRef, Html, Selector};

use crate::features::news::dto::{Article, NewsApiArticle, Outlet};

pub(super) const POLITICAL_KEYWORDS: &[&str] = &[
    "politics",
    "government",
    "congress",
    "senate",
    "white house",
    "biden",
    "trump",
    "election",
    "democrat",
    "republican",
    "campaign",
    "vote",
    "legislation",
    "policy",
];

const REMOVED_MARKER: &str = "[Removed]";

const MIN_PARAGRAPH_CHARS: usize = 50;
const BOILERPLATE_CONTAINERS: &[&str] = &["nav", "header", "footer", "aside", "script", "style"];

pub(super) fn is_political(article: &Article) -> bool {
    let title = article.title.to_lowercase();
    let description = article.description.to_lowercase();
    POLITICAL_KEYWORDS
        .iter()
        .any(|keyword| title.contains(keyword) || description.contains(keyword))
}

/// Turns raw NewsAPI records into articles tagged with `outlet`, newest
/// first. Records without a usable title, URL or timestamp are dropped, as
/// are NewsAPI's removed-content placeholders and repeated URLs.
pub(super) fn normalise_articles(raw: Vec<NewsApiArticle>, outlet: Outlet) -> Vec<Article> {
    let mut seen = HashSet::new();
    let mut articles: Vec<Article> = raw
        .into_iter()
        .filter_map(|item| {
            let title = clean_text(item.title)?;
            let url = clean_text(item.url)?;
            if title == REMOVED_MARKER || url.contains("removed.com") {
                return None;
            }
            let published_at = parse_timestamp(item.published_at.as_deref()?)?;
            let description = clean_text(item.description)
                .filter(|value| value != REMOVED_MARKER)
                .unwrap_or_default();

            Some(Article {
                title,
                source: outlet,
                published_at,
                url,
                description,
                body: None,
            })
        })
        .filter(|article| seen.insert(article.url.clone()))
        .collect();

    articles.sort_by(|a, b| {
        b.published_at
            .cmp(&a.published_at)
            .then_with(|| a.url.cmp(&b.url))
    });
    articles
}

pub(super) fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|parsed| parsed.with_timezone(&Utc))
}

/// NewsAPI reports failures as `{"status":"error","code":..,"message":..}`.
pub(super) fn describe_api_error(body: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => {
            let message = value
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown error");
            match value.get("code").and_then(|v| v.as_str()) {
                Some(code) => format!("{message} (code: {code})"),
                None => message.to_string(),
            }
        }
        Err(_) => body.trim().to_string(),
    }
}

/// Joins the substantial `<p>` paragraphs of an article page, skipping
/// navigation, header and footer chrome. `None` when nothing usable is left.
pub(super) fn extract_paragraphs(html: &str, max_chars: usize) -> Option<String> {
    let document = Html::parse_document(html);
    let paragraph = Selector::parse("p").ok()?;

    let mut text = String::new();
    for element in document.select(&paragraph) {
        if in_boilerplate(&element) {
            continue;
        }
        let content = element.text().collect::<String>();
        let content = content.split_whitespace().collect::<Vec<_>>().join(" ");
        if content.chars().count() <= MIN_PARAGRAPH_CHARS {
            continue;
        }
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&content);
        if text.chars().count() >= max_chars {
            break;
        }
    }

    if text.is_empty() {
        return None;
    }
    Some(text.chars().take(max_chars).collect())
}

fn in_boilerplate(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| BOILERPLATE_CONTAINERS.contains(&ancestor.value().name()))
}

fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
}
