use serde::{Deserialize, Serialize};

use crate::features::news::{Article, Outlet};

/// Articles from both outlets judged to cover the same story. Each side is
/// ordered newest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub label: String,
    pub liberal_articles: Vec<Article>,
    pub conservative_articles: Vec<Article>,
}

impl Topic {
    pub fn is_comparable(&self) -> bool {
        !self.liberal_articles.is_empty() && !self.conservative_articles.is_empty()
    }

    /// The only outlet with coverage, when exactly one side has articles.
    pub fn single_outlet(&self) -> Option<Outlet> {
        match (
            self.liberal_articles.is_empty(),
            self.conservative_articles.is_empty(),
        ) {
            (false, true) => Some(Outlet::Liberal),
            (true, false) => Some(Outlet::Conservative),
            _ => None,
        }
    }

    pub fn article_count(&self) -> usize {
        self.liberal_articles.len() + self.conservative_articles.len()
    }

    pub fn articles_for(&self, outlet: Outlet) -> &[Article] {
        match outlet {
            Outlet::Liberal => &self.liberal_articles,
            Outlet::Conservative => &self.conservative_articles,
        }
    }
}
