//! Generic heuristic extractor for sites without a custom strategy.
//!
//! # Title
//!
//! First non-empty `<h1>`, else `og:title` / `twitter:title`, else
//! `<title>`. Every candidate goes through [`clean_title`], which strips a
//! trailing ` – Site Name` style suffix.
//!
//! # Body
//!
//! Each `article`, `main`, `section` and `div` is scored with
//! [`container_score`]:
//!
//! ```text
//! score = paragraph_chars × (1 + ln(1 + paragraphs)) − 30 × anchors
//! ```
//!
//! The best element scoring at least [`MIN_CONTAINER_SCORE`] holds the body.
//! Its paragraphs are kept when 40+ characters, free of boilerplate phrases,
//! and not a short label ending in `:`. Without a container, every page
//! paragraph over 80 characters is used instead. Both paths stop at 120.
//!
//! # Published
//!
//! An ordered list of lookups feeds candidate strings to
//! [`dates::normalize`](crate::dates::normalize); the first one that parses wins.

use super::{ExtractionStrategy, assemble};
use crate::dates;
use crate::error::Rejection;
use crate::models::Article;
use crate::utils::{collapse_whitespace, element_text, word_count};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Containers must reach this score to be trusted.
pub const MIN_CONTAINER_SCORE: f64 = 180.0;
/// Minimum characters for a paragraph kept from the chosen container.
pub const MIN_PARAGRAPH_CHARS: usize = 40;
/// Minimum characters (exclusive) for a paragraph in the whole-page fallback.
pub const FALLBACK_PARAGRAPH_CHARS: usize = 80;
/// Cap on retained paragraphs.
pub const MAX_PARAGRAPHS: usize = 120;

const ANCHOR_PENALTY: f64 = 30.0;

/// Phrases that mark a paragraph as page furniture rather than article text.
pub const BOILERPLATE_PHRASES: &[&str] = &[
    "related articles",
    "you may also like",
    "more stories",
    "follow us",
    "share this",
    "advertisement",
    "sponsored content",
    "recommended",
    "read more",
    "watch:",
    "photo:",
    "video:",
];

static TITLE_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+[–\-—|•·]\s+.*$").expect("valid title suffix regex"));

static ISO_IN_TEXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?(?:Z|[+-]\d{2}:?\d{2})?")
        .expect("valid ISO scan regex")
});

static URL_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/(\d{4})/(\d{2})/(\d{2})/").expect("valid URL date regex"));

static H1: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static SOCIAL_TITLE: Lazy<Selector> = Lazy::new(|| {
    Selector::parse(r#"meta[property="og:title"], meta[name="twitter:title"]"#).unwrap()
});
static DOC_TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static CONTAINERS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article, main, section, div").unwrap());
static P: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static A: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static TIME: Lazy<Selector> = Lazy::new(|| Selector::parse("time").unwrap());

static META_PUBLISHED: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        r#"meta[property="article:published_time"]"#,
        r#"meta[name="pubdate"]"#,
        r#"meta[name="publish-date"]"#,
        r#"meta[name="publication_date"]"#,
        r#"meta[itemprop="datePublished"]"#,
        r#"meta[property="og:updated_time"]"#,
        r#"meta[name="date"]"#,
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

static DATE_CLASSES: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "span.pubdate",
        ".published-date",
        ".article-date",
        ".date",
        ".byline time",
        ".meta__date",
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

/// The fallback heuristic strategy.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericStrategy;

impl ExtractionStrategy for GenericStrategy {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn extract(&self, url: &str, document: &Html) -> Result<Article, Rejection> {
        let title = extract_title(document);
        let mut paragraphs = find_best_container(document)
            .map(|el| retain_paragraphs(&el))
            .unwrap_or_default();
        if paragraphs.is_empty() {
            paragraphs = fallback_paragraphs(document);
            debug!(count = paragraphs.len(), "Used whole-page paragraph fallback");
        }
        let published = extract_published(document, url);
        assemble(url, title, &paragraphs, published)
    }
}

// ---- Title ----

type TitleLookup = fn(&Html) -> Option<String>;

const TITLE_LOOKUPS: &[TitleLookup] = &[first_h1, social_meta_title, document_title];

fn first_h1(document: &Html) -> Option<String> {
    document
        .select(&H1)
        .map(|h| element_text(&h))
        .find(|t| !t.is_empty())
}

fn social_meta_title(document: &Html) -> Option<String> {
    document
        .select(&SOCIAL_TITLE)
        .filter_map(|m| m.value().attr("content"))
        .map(collapse_whitespace)
        .find(|t| !t.is_empty())
}

fn document_title(document: &Html) -> Option<String> {
    document.select(&DOC_TITLE).next().map(|t| element_text(&t))
}

/// Normalize whitespace and strip a trailing ` - Site Name` decoration.
///
/// Returns `None` when nothing is left.
pub fn clean_title(raw: &str) -> Option<String> {
    let collapsed = collapse_whitespace(raw);
    let cleaned = TITLE_SUFFIX.replace(&collapsed, "").trim().to_string();
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Headline of the page via the title lookup chain.
pub fn extract_title(document: &Html) -> Option<String> {
    TITLE_LOOKUPS
        .iter()
        .find_map(|lookup| lookup(document).and_then(|t| clean_title(&t)))
}

// ---- Body ----

/// Score a candidate container from its paragraph and anchor statistics.
///
/// Non-decreasing in `paragraph_chars`; strictly decreasing in `anchors`.
pub fn container_score(paragraph_chars: usize, paragraphs: usize, anchors: usize) -> f64 {
    paragraph_chars as f64 * (1.0 + (paragraphs as f64).ln_1p()) - ANCHOR_PENALTY * anchors as f64
}

/// Score an element by its descendant `<p>` and `<a>` elements.
pub fn score_element(el: &ElementRef<'_>) -> f64 {
    let mut paragraphs = 0usize;
    let mut chars = 0usize;
    for p in el.select(&P) {
        paragraphs += 1;
        chars += element_text(&p).chars().count();
    }
    if paragraphs == 0 {
        return 0.0;
    }
    container_score(chars, paragraphs, el.select(&A).count())
}

/// The highest-scoring block element, if it clears [`MIN_CONTAINER_SCORE`].
///
/// Ties go to the element that appears first in the document.
pub fn find_best_container(document: &Html) -> Option<ElementRef<'_>> {
    let mut best: Option<(f64, ElementRef<'_>)> = None;
    for el in document.select(&CONTAINERS) {
        let score = score_element(&el);
        if score <= 0.0 {
            continue;
        }
        if best.as_ref().is_none_or(|(s, _)| score > *s) {
            best = Some((score, el));
        }
    }
    match best {
        Some((score, el)) if score >= MIN_CONTAINER_SCORE => {
            debug!(score, tag = el.value().name(), "Selected content container");
            Some(el)
        }
        Some((score, _)) => {
            debug!(score, "Best container below threshold");
            None
        }
        None => None,
    }
}

/// `true` for paragraphs that read like page furniture.
pub fn is_boilerplate(text: &str) -> bool {
    let low = text.to_lowercase();
    if BOILERPLATE_PHRASES.iter().any(|bad| low.contains(bad)) {
        return true;
    }
    word_count(text) <= 6 && text.ends_with(':')
}

/// Paragraphs of `el` that pass the length and boilerplate filters.
pub fn retain_paragraphs(el: &ElementRef<'_>) -> Vec<String> {
    el.select(&P)
        .map(|p| element_text(&p))
        .filter(|t| t.chars().count() >= MIN_PARAGRAPH_CHARS && !is_boilerplate(t))
        .take(MAX_PARAGRAPHS)
        .collect()
}

/// Every paragraph on the page longer than [`FALLBACK_PARAGRAPH_CHARS`].
pub fn fallback_paragraphs(document: &Html) -> Vec<String> {
    document
        .select(&P)
        .map(|p| element_text(&p))
        .filter(|t| t.chars().count() > FALLBACK_PARAGRAPH_CHARS)
        .take(MAX_PARAGRAPHS)
        .collect()
}

// ---- Published ----

type DateLookup = fn(&Html, &str) -> Vec<String>;

const PUBLISHED_LOOKUPS: &[DateLookup] = &[
    meta_published,
    time_elements,
    date_class_elements,
    iso_in_page_text,
    url_path_date,
];

fn meta_published(document: &Html, _url: &str) -> Vec<String> {
    META_PUBLISHED
        .iter()
        .filter_map(|sel| document.select(sel).next())
        .filter_map(|el| {
            el.value()
                .attr("content")
                .or_else(|| el.value().attr("value"))
                .map(collapse_whitespace)
                .or_else(|| Some(element_text(&el)))
        })
        .filter(|v| !v.is_empty())
        .collect()
}

fn time_elements(document: &Html, _url: &str) -> Vec<String> {
    document
        .select(&TIME)
        .map(|t| match t.value().attr("datetime") {
            Some(dt) => dt.trim().to_string(),
            None => element_text(&t),
        })
        .filter(|v| !v.is_empty())
        .collect()
}

fn date_class_elements(document: &Html, _url: &str) -> Vec<String> {
    DATE_CLASSES
        .iter()
        .filter_map(|sel| document.select(sel).next())
        .map(|el| match el.value().attr("datetime") {
            Some(dt) => dt.trim().to_string(),
            None => element_text(&el),
        })
        .filter(|v| !v.is_empty())
        .collect()
}

fn iso_in_page_text(document: &Html, _url: &str) -> Vec<String> {
    let text = document.root_element().text().collect::<Vec<_>>().join(" ");
    ISO_IN_TEXT
        .find(&text)
        .map(|m| vec![m.as_str().to_string()])
        .unwrap_or_default()
}

fn url_path_date(_document: &Html, url: &str) -> Vec<String> {
    let path = url::Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_default();
    URL_DATE
        .captures(&path)
        .map(|c| vec![format!("{}-{}-{}", &c[1], &c[2], &c[3])])
        .unwrap_or_default()
}

/// Candidate publication strings in lookup order.
pub fn published_candidates(document: &Html, url: &str) -> Vec<String> {
    PUBLISHED_LOOKUPS
        .iter()
        .flat_map(|lookup| lookup(document, url))
        .collect()
}

/// First candidate that parses as a timestamp.
pub fn extract_published(document: &Html, url: &str) -> Option<DateTime<Utc>> {
    published_candidates(document, url)
        .iter()
        .find_map(|raw| dates::normalize(raw))
}
