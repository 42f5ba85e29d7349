use std::cmp::Ordering;
use std::collections::BTreeSet;

use tracing::debug;

use crate::config::{AppConfig, MAX_TOPICS_CAP};
use crate::features::news::{Article, Outlet};
use crate::features::topics::dto::Topic;
use crate::features::topics::helpers::{jaccard, keywords, tokenize};

/// Groups articles into stories by keyword overlap and ranks the stories
/// both outlets covered by how many articles they drew.
///
/// Clustering is greedy single-link over articles taken newest first, so the
/// output depends only on the article set and the threshold, never on the
/// order the articles arrive in.
#[derive(Debug, Clone)]
pub struct TopicSelector {
    threshold: f32,
    max_topics: usize,
    ignored_terms: BTreeSet<String>,
}

impl TopicSelector {
    pub fn new(threshold: f32, max_topics: usize) -> Self {
        Self {
            threshold,
            max_topics: max_topics.clamp(1, MAX_TOPICS_CAP),
            ignored_terms: BTreeSet::new(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let outlet_terms = Outlet::ALL.into_iter().flat_map(|outlet| {
            let source = config.source(outlet);
            tokenize(&source.name)
                .chain(tokenize(&source.domain))
                .collect::<Vec<_>>()
        });

        Self::new(config.similarity_threshold, config.max_topics).with_ignored_terms(outlet_terms)
    }

    /// Words that never count towards similarity, e.g. outlet names that
    /// appear in every headline from that outlet.
    pub fn with_ignored_terms<I>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        self.ignored_terms
            .extend(terms.into_iter().map(|term| term.to_lowercase()));
        self
    }

    pub fn max_topics(&self) -> usize {
        self.max_topics
    }

    /// Stories covered by both outlets, largest first, at most `max_topics`.
    pub fn select(&self, articles: &[Article]) -> Vec<Topic> {
        let clusters = self.cluster(articles);
        let candidates = clusters.len();
        let topics = self.rank(clusters.into_iter().filter(Topic::is_comparable).collect());

        debug!(
            target: "selector",
            articles = articles.len(),
            candidates,
            selected = topics.len(),
            "selected topics"
        );

        topics
    }

    /// Stories from a single outlet, largest first, at most `max_topics`.
    /// Used when the other outlet could not be reached, so no story can be
    /// covered by both.
    pub fn select_single_outlet(&self, articles: &[Article]) -> Vec<Topic> {
        let clusters = self.cluster(articles);
        let candidates = clusters.len();
        let topics = self.rank(
            clusters
                .into_iter()
                .filter(|topic| topic.single_outlet().is_some())
                .collect(),
        );

        debug!(
            target: "selector",
            articles = articles.len(),
            candidates,
            selected = topics.len(),
            "selected single-outlet topics"
        );

        topics
    }

    fn cluster(&self, articles: &[Article]) -> Vec<Topic> {
        let mut ordered: Vec<&Article> = articles.iter().collect();
        ordered.sort_by(|a, b| recency_order(a, b));

        let keyword_sets: Vec<BTreeSet<String>> = ordered
            .iter()
            .map(|article| keywords(article, &self.ignored_terms))
            .collect();

        let mut clusters: Vec<Vec<usize>> = Vec::new();
        for (index, words) in keyword_sets.iter().enumerate() {
            let mut best: Option<(usize, f32)> = None;

            for (cluster_index, members) in clusters.iter().enumerate() {
                let score = members
                    .iter()
                    .map(|&member| jaccard(words, &keyword_sets[member]))
                    .fold(0.0f32, f32::max);
                if score >= self.threshold && best.is_none_or(|(_, best_score)| score > best_score) {
                    best = Some((cluster_index, score));
                }
            }

            match best {
                Some((cluster_index, _)) => clusters[cluster_index].push(index),
                None => clusters.push(vec![index]),
            }
        }

        clusters
            .into_iter()
            .map(|members| build_topic(&ordered, &members))
            .collect()
    }

    fn rank(&self, mut topics: Vec<Topic>) -> Vec<Topic> {
        topics.sort_by(rank_order);
        topics.truncate(self.max_topics);
        topics
    }
}

fn recency_order(a: &Article, b: &Article) -> Ordering {
    b.published_at
        .cmp(&a.published_at)
        .then_with(|| a.url.cmp(&b.url))
        .then_with(|| a.source.cmp(&b.source))
        .then_with(|| a.title.cmp(&b.title))
        .then_with(|| a.description.cmp(&b.description))
}

/// `members` index into `ordered` in ascending order, so each side stays
/// newest first and the first member is the newest article overall.
fn build_topic(ordered: &[&Article], members: &[usize]) -> Topic {
    let label = ordered[members[0]].title.clone();
    let (liberal_articles, conservative_articles): (Vec<Article>, Vec<Article>) = members
        .iter()
        .map(|&member| ordered[member].clone())
        .partition(|article| article.source == Outlet::Liberal);

    Topic {
        label,
        liberal_articles,
        conservative_articles,
    }
}

fn newest(topic: &Topic) -> Option<chrono::DateTime<chrono::Utc>> {
    topic
        .liberal_articles
        .first()
        .into_iter()
        .chain(topic.conservative_articles.first())
        .map(|article| article.published_at)
        .max()
}

fn rank_order(a: &Topic, b: &Topic) -> Ordering {
    b.article_count()
        .cmp(&a.article_count())
        .then_with(|| newest(b).cmp(&newest(a)))
        .then_with(|| a.label.cmp(&b.label))
}
