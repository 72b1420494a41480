//! Reuters strategy.
//!
//! Reuters has renamed its body wrapper with each redesign; all known class
//! names are matched together, with a bare `article p` as the last resort.

use super::{ExtractionStrategy, SiteMarkup};
use crate::error::Rejection;
use crate::models::Article;
use scraper::Html;

const MARKUP: SiteMarkup = SiteMarkup {
    body: "div.ArticleBodyWrapper p, .article-body__content p, .StandardArticleBody_body p, article p",
    min_paragraph: 30,
    published: &[
        ("meta[property='article:published_time']", "content"),
        ("time[datetime]", "datetime"),
    ],
};

/// Strategy for `reuters.com`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Reuters;

impl ExtractionStrategy for Reuters {
    fn name(&self) -> &'static str {
        "reuters"
    }

    fn extract(&self, url: &str, document: &Html) -> Result<Article, Rejection> {
        MARKUP.extract(url, document)
    }
}
