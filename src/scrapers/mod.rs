//! Article extraction strategies.
//!
//! Every page goes through exactly one [`ExtractionStrategy`]. The
//! [`StrategyRegistry`] maps a domain suffix to a site-specific strategy and
//! falls back to the [`generic::GenericStrategy`] heuristic for everything
//! else. Adding a site means registering a strategy, not touching dispatch.
//!
//! # Supported Sources
//!
//! | Source | Module | Domain suffixes |
//! |--------|--------|-----------------|
//! | CNN | [`cnn`] | `cnn.com` |
//! | BBC | [`bbc`] | `bbc.com`, `bbc.co.uk` |
//! | New York Times | [`nytimes`] | `nytimes.com` |
//! | The Guardian | [`guardian`] | `theguardian.com` |
//! | Reuters | [`reuters`] | `reuters.com` |
//! | Al Jazeera | [`aljazeera`] | `aljazeera.net`, `aljazeera.com` |
//!
//! # Acceptance Contract
//!
//! All strategies finish through [`assemble`]: a title of at least 3 words and
//! at least 2 paragraphs totalling 150+ characters, or a [`Rejection`]. A
//! site-specific strategy that rejects a page is final for that URL; the
//! generic heuristic is not tried as a second chance.

pub mod aljazeera;
pub mod bbc;
pub mod cnn;
pub mod generic;
pub mod guardian;
pub mod nytimes;
pub mod reuters;

use crate::error::Rejection;
use crate::language;
use crate::models::{Article, normalize_domain};
use crate::utils::{element_text, word_count};
use chrono::{DateTime, Utc};
use scraper::{Html, Selector};
use tracing::{debug, instrument};

/// Minimum words in an accepted title.
pub const MIN_TITLE_WORDS: usize = 3;
/// Minimum retained paragraphs in an accepted body.
pub const MIN_PARAGRAPHS: usize = 2;
/// Minimum characters in an accepted body.
pub const MIN_BODY_CHARS: usize = 150;

/// Turns a parsed article page into an [`Article`] or a [`Rejection`].
pub trait ExtractionStrategy: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Extract an article from `document`, fetched from `url`.
    fn extract(&self, url: &str, document: &Html) -> Result<Article, Rejection>;
}

/// Domain-suffix dispatch table over extraction strategies.
pub struct StrategyRegistry {
    generic: generic::GenericStrategy,
    sites: Vec<(String, Box<dyn ExtractionStrategy>)>,
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl StrategyRegistry {
    /// A registry with only the generic heuristic.
    pub fn new() -> Self {
        Self {
            generic: generic::GenericStrategy,
            sites: Vec::new(),
        }
    }

    /// A registry with every built-in site-specific strategy registered.
    pub fn with_builtin_sites() -> Self {
        let mut registry = Self::new();
        registry.register("cnn.com", Box::new(cnn::Cnn));
        registry.register("bbc.com", Box::new(bbc::Bbc));
        registry.register("bbc.co.uk", Box::new(bbc::Bbc));
        registry.register("nytimes.com", Box::new(nytimes::NyTimes));
        registry.register("theguardian.com", Box::new(guardian::Guardian));
        registry.register("reuters.com", Box::new(reuters::Reuters));
        registry.register("aljazeera.net", Box::new(aljazeera::AlJazeera));
        registry.register("aljazeera.com", Box::new(aljazeera::AlJazeera));
        registry
    }

    /// Route URLs whose domain is `suffix` or a subdomain of it to `strategy`.
    pub fn register(&mut self, suffix: &str, strategy: Box<dyn ExtractionStrategy>) {
        self.sites.push((suffix.to_ascii_lowercase(), strategy));
    }

    /// The strategy responsible for `url`.
    pub fn strategy_for(&self, url: &str) -> &dyn ExtractionStrategy {
        let domain = normalize_domain(url);
        self.sites
            .iter()
            .find(|(suffix, _)| domain_matches(&domain, suffix))
            .map(|(_, s)| &**s)
            .unwrap_or(&self.generic)
    }

    /// Parse `html` and run the strategy responsible for `url`.
    #[instrument(level = "debug", skip(self, html), fields(bytes = html.len()))]
    pub fn extract(&self, url: &str, html: &str) -> Result<Article, Rejection> {
        let strategy = self.strategy_for(url);
        debug!(strategy = strategy.name(), "Dispatching extraction");
        let document = Html::parse_document(html);
        strategy.extract(url, &document)
    }
}

/// `true` when `domain` equals `suffix` or ends with `.suffix`.
pub fn domain_matches(domain: &str, suffix: &str) -> bool {
    domain == suffix
        || domain
            .strip_suffix(suffix)
            .is_some_and(|head| head.ends_with('.'))
}

/// Apply the shared acceptance contract and build the article.
///
/// The body is the paragraphs joined by single spaces; the language is
/// detected from that body.
pub fn assemble(
    url: &str,
    title: Option<String>,
    paragraphs: &[String],
    published: Option<DateTime<Utc>>,
) -> Result<Article, Rejection> {
    let title = title.ok_or(Rejection::MissingTitle)?;
    let words = word_count(&title);
    if words < MIN_TITLE_WORDS {
        return Err(Rejection::ShortTitle { words });
    }
    let body = paragraphs.join(" ").trim().to_string();
    let chars = body.chars().count();
    if paragraphs.len() < MIN_PARAGRAPHS || chars < MIN_BODY_CHARS {
        return Err(Rejection::ThinBody {
            paragraphs: paragraphs.len(),
            chars,
        });
    }
    let language = language::detect(&body);
    Ok(Article::new(url, title, body, published, language))
}

/// Markup conventions of one publication.
pub struct SiteMarkup {
    /// Selector group matching body paragraphs.
    pub body: &'static str,
    /// Paragraphs must be strictly longer than this many characters.
    pub min_paragraph: usize,
    /// `(selector, attribute)` pairs tried in order for the publication time.
    pub published: &'static [(&'static str, &'static str)],
}

impl SiteMarkup {
    /// Body paragraphs matching [`SiteMarkup::body`], in document order.
    pub fn paragraphs(&self, document: &Html) -> Vec<String> {
        let Ok(selector) = Selector::parse(self.body) else {
            return Vec::new();
        };
        document
            .select(&selector)
            .map(|p| element_text(&p))
            .filter(|t| t.chars().count() > self.min_paragraph)
            .collect()
    }

    /// Publication time from the site's own markup, else the generic chain.
    pub fn published(&self, document: &Html, url: &str) -> Option<DateTime<Utc>> {
        published_from(document, url, self.published)
    }

    /// Run the standard site pipeline: generic title, site body, site date.
    pub fn extract(&self, url: &str, document: &Html) -> Result<Article, Rejection> {
        let title = generic::extract_title(document);
        let paragraphs = self.paragraphs(document);
        let published = self.published(document, url);
        assemble(url, title, &paragraphs, published)
    }
}

/// Publication time from the first `(selector, attribute)` pair whose value
/// parses, else the generic lookup chain.
pub fn published_from(
    document: &Html,
    url: &str,
    lookups: &[(&str, &str)],
) -> Option<DateTime<Utc>> {
    lookups
        .iter()
        .find_map(|(sel, attr)| {
            attribute_value(document, sel, attr).and_then(|raw| crate::dates::normalize(&raw))
        })
        .or_else(|| generic::extract_published(document, url))
}

/// First non-empty `attr` value among elements matching `selector`.
pub fn attribute_value(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let selector = Selector::parse(selector).ok()?;
    document
        .select(&selector)
        .filter_map(|el| el.value().attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}
