//! The Guardian strategy.

use super::{ExtractionStrategy, SiteMarkup};
use crate::error::Rejection;
use crate::models::Article;
use scraper::Html;

const MARKUP: SiteMarkup = SiteMarkup {
    body: "div[itemprop='articleBody'] p, article p, .content__article-body p",
    min_paragraph: 30,
    published: &[("time[datetime]", "datetime")],
};

#[derive(Debug, Default, Clone, Copy)]
pub struct Guardian;

impl ExtractionStrategy for Guardian {
    fn name(&self) -> &'static str {
        "guardian"
    }

    fn extract(&self, url: &str, document: &Html) -> Result<Article, Rejection> {
        MARKUP.extract(url, document)
    }
}
