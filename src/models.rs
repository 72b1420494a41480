//! Data models for sites, candidate links and extracted articles.
//!
//! - [`Site`]: a seed listing page taken from configuration
//! - [`CandidateLink`]: a URL found on a listing page, in discovery order
//! - [`Article`]: the canonical extracted record that gets persisted and exported
//! - [`ScrapeRun`]: the in-memory result of one orchestrator run
//!
//! An [`Article`]'s `length` and `source` are derived from `body` and `url`
//! in [`Article::new`] and cannot be set independently.

use crate::dates;
use crate::error::Rejection;
use chrono::{DateTime, Utc};

/// Lowercase host of `url` with a leading `www.` removed.
///
/// Returns an empty string for inputs that do not parse as URLs.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(normalize_domain("https://www.BBC.com/news/x"), "bbc.com");
/// ```
pub fn normalize_domain(url: &str) -> String {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
        .map(|h| h.strip_prefix("www.").map(str::to_string).unwrap_or(h))
        .unwrap_or_default()
}

/// A listing page to crawl.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub url: String,
    pub domain: String,
}

impl Site {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        let domain = normalize_domain(&url);
        Self { url, domain }
    }
}

/// A link discovered on a listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateLink {
    /// Absolute URL.
    pub url: String,
    /// Anchor text, whitespace-collapsed.
    pub anchor_text: String,
    /// Zero-based position in the classifier's output.
    pub order: usize,
}

/// A news article extracted from a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Article {
    url: String,
    title: String,
    body: String,
    published: Option<DateTime<Utc>>,
    length: usize,
    source: String,
    language: String,
}

impl Article {
    /// Build an article, deriving `length` from `body` and `source` from `url`.
    ///
    /// An empty `language` is stored as [`UNKNOWN_LANGUAGE`](crate::language::UNKNOWN_LANGUAGE).
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        body: impl Into<String>,
        published: Option<DateTime<Utc>>,
        language: impl Into<String>,
    ) -> Self {
        let url = url.into();
        let body = body.into();
        let mut language = language.into();
        if language.trim().is_empty() {
            language = crate::language::UNKNOWN_LANGUAGE.to_string();
        }
        Self {
            source: normalize_domain(&url),
            length: body.chars().count(),
            url,
            title: title.into(),
            body,
            published,
            language,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn published(&self) -> Option<DateTime<Utc>> {
        self.published
    }

    /// `published` in the canonical `YYYY-MM-DD HH:MM:SS` UTC form.
    pub fn published_text(&self) -> Option<String> {
        self.published.as_ref().map(dates::canonical)
    }

    /// Character count of `body`.
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn language(&self) -> &str {
        &self.language
    }
}

/// What happened to one candidate link.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Accepted,
    Rejected(Rejection),
    FetchFailed,
}

/// Per-link log entry of a run.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkOutcome {
    pub url: String,
    pub outcome: Outcome,
}

/// Result of crawling one site.
#[derive(Debug, Clone, Default)]
pub struct SiteReport {
    pub site: String,
    pub candidates: usize,
    pub articles: Vec<Article>,
    pub outcomes: Vec<LinkOutcome>,
}

/// Result of one orchestrator run across all configured sites.
#[derive(Debug, Clone, Default)]
pub struct ScrapeRun {
    pub sites: Vec<SiteReport>,
}

impl ScrapeRun {
    /// All accepted articles, in site then link order.
    pub fn articles(&self) -> Vec<Article> {
        self.sites
            .iter()
            .flat_map(|s| s.articles.iter().cloned())
            .collect()
    }

    /// Total candidate links attempted or skipped across sites.
    pub fn candidates(&self) -> usize {
        self.sites.iter().map(|s| s.candidates).sum()
    }

    /// Count of links with the given outcome kind.
    pub fn count_where(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.sites
            .iter()
            .flat_map(|s| s.outcomes.iter())
            .filter(|o| pred(&o.outcome))
            .count()
    }
}
