use std::collections::BTreeSet;

use crate::features::news::Article;

const MIN_KEYWORD_CHARS: usize = 3;

const STOP_WORDS: &[&str] = &[
    "about", "after", "again", "against", "all", "also", "and", "any", "are", "amid", "back",
    "been", "before", "being", "but", "can", "could", "did", "does", "during", "each", "for",
    "from", "had", "has", "have", "her", "here", "his", "how", "into", "its", "just", "latest",
    "live", "more", "most", "new", "news", "not", "now", "off", "one", "only", "other", "our",
    "out", "over", "said", "say", "says", "she", "should", "some", "than", "that", "the",
    "their", "them", "then", "there", "these", "they", "this", "those", "through", "under",
    "updates", "very", "video", "was", "watch", "way", "week", "were", "what", "when", "where",
    "which", "while", "who", "why", "will", "with", "would", "year", "you", "your",
];

/// Lowercased content words of `article`'s title and description, minus stop
/// words and `ignored` terms (typically the outlets' own names).
pub(super) fn keywords(article: &Article, ignored: &BTreeSet<String>) -> BTreeSet<String> {
    tokenize(&article.title)
        .chain(tokenize(&article.description))
        .filter(|word| word.chars().count() >= MIN_KEYWORD_CHARS)
        .filter(|word| !word.chars().all(|c| c.is_ascii_digit()))
        .filter(|word| !STOP_WORDS.contains(&word.as_str()))
        .filter(|word| !ignored.contains(word))
        .collect()
}

pub(super) fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
}

pub(super) fn jaccard(left: &BTreeSet<String>, right: &BTreeSet<String>) -> f32 {
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let shared = left.intersection(right).count();
    let union = left.len() + right.len() - shared;
    shared as f32 / union as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::news::Outlet;
    use chrono::Utc;

    fn article(title: &str, description: &str) -> Article {
        Article {
            title: title.to_string(),
            source: Outlet::Liberal,
            published_at: Utc::now(),
            url: "https://example.com".to_string(),
            description: description.to_string(),
            body: None,
        }
    }

    #[test]
    fn keywords_skip_stop_words_and_ignored_terms() {
        let ignored: BTreeSet<String> = ["cnn".to_string()].into_iter().collect();
        let words = keywords(
            &article("The Senate's new border bill | CNN", "Votes in 2026 on the bill"),
            &ignored,
        );
        let words: Vec<&str> = words.iter().map(String::as_str).collect();
        assert_eq!(words, vec!["bill", "border", "senate", "votes"]);
    }

    #[test]
    fn jaccard_bounds() {
        let a: BTreeSet<String> = ["x", "y"].iter().map(|s| s.to_string()).collect();
        let b: BTreeSet<String> = ["y", "z"].iter().map(|s| s.to_string()).collect();
        assert!((jaccard(&a, &b) - 1.0 / 3.0).abs() < f32::EPSILON);
        assert_eq!(jaccard(&a, &a), 1.0);
        assert_eq!(jaccard(&a, &BTreeSet::new()), 0.0);
    }
}
