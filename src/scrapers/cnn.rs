//! CNN article strategy.
//!
//! CNN has moved its body markup several times, so the selectors are tried
//! one after another, accumulating paragraphs until at least four are found.
//! Pages that match none of them fall back to the generic paragraph filter
//! over the `<article>` element.
//!
//! # URL Pattern
//!
//! Articles live under dated paths such as
//! `https://edition.cnn.com/2025/05/06/world/article-slug`.

use super::generic::{extract_title, retain_paragraphs};
use super::{ExtractionStrategy, assemble, published_from};
use crate::error::Rejection;
use crate::models::Article;
use crate::utils::element_text;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;

const BODY_SELECTORS: &[&str] = &[
    "div.l-container article p",
    "div.pg-rail-tall__body p",
    "article p",
    "div.zn-body__paragraph",
    "div.article__content p",
];

/// Stop walking selectors once this many paragraphs are collected.
const ENOUGH_PARAGRAPHS: usize = 4;

const PUBLISHED: &[(&str, &str)] = &[
    ("meta[itemprop='datePublished']", "content"),
    ("meta[name='pubdate']", "content"),
    ("meta[property='article:published_time']", "content"),
];

static ARTICLE: Lazy<Selector> = Lazy::new(|| Selector::parse("article").unwrap());

/// Strategy for `cnn.com` and its editions.
#[derive(Debug, Default, Clone, Copy)]
pub struct Cnn;

impl Cnn {
    fn paragraphs(document: &Html) -> Vec<String> {
        let mut paras = Vec::new();
        for sel in BODY_SELECTORS {
            let Ok(selector) = Selector::parse(sel) else {
                continue;
            };
            paras.extend(
                document
                    .select(&selector)
                    .map(|p| element_text(&p))
                    .filter(|t| !t.is_empty()),
            );
            if paras.len() >= ENOUGH_PARAGRAPHS {
                break;
            }
        }
        if paras.is_empty() {
            if let Some(article) = document.select(&ARTICLE).next() {
                debug!("No CNN body selector matched; filtering <article> paragraphs");
                paras = retain_paragraphs(&article);
            }
        }
        paras
    }
}

impl ExtractionStrategy for Cnn {
    fn name(&self) -> &'static str {
        "cnn"
    }

    fn extract(&self, url: &str, document: &Html) -> Result<Article, Rejection> {
        let paragraphs = Self::paragraphs(document);
        let published = published_from(document, url, PUBLISHED);
        assemble(url, extract_title(document), &paragraphs, published)
    }
}
