//! Article link discovery on listing pages.
//!
//! [`classify`] walks the listing page in four tiers of decreasing confidence
//! and stops as soon as `limit` links are collected:
//!
//! 1. anchors inside headings (`h1`..`h3`)
//! 2. anchors matching common card/promo/headline selectors
//! 3. every remaining anchor
//! 4. long hyphenated slugs, skipping the keyword and anchor-text checks
//!
//! The filter is recall-oriented. A false positive costs one fetch that the
//! extractor will reject; a false negative is a lost article.

use crate::models::CandidateLink;
use crate::utils::{element_text, word_count};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{debug, info, instrument};
use url::Url;

static BAD_EXT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\.(jpg|jpeg|png|gif|webp|svg|pdf|mp4|mp3|zip|rss|xml|ico)$")
        .expect("valid extension regex")
});

static DATE_PATH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/\d{4}/\d{2}/\d{2}/").expect("valid date path regex"));

const BAD_SUBSTRINGS: &[&str] = &[
    "mailto:",
    "tel:",
    "#",
    "signup",
    "login",
    "terms",
    "privacy",
    "javascript:",
];

const SECTION_HINTS: &[&str] = &[
    "/section/",
    "/topic/",
    "/tag/",
    "/tags/",
    "/category/",
    "/categories/",
    "/topics/",
    "/collections/",
    "/series/",
];

const POSITIVE_SIGNS: &[&str] = &[
    "/news/",
    "/article/",
    "/story/",
    "/world/",
    "/politics/",
    "/business/",
    "/202",
];

static HEADING_ANCHORS: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h1 a[href], h2 a[href], h3 a[href]").unwrap());

static CARD_ANCHORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        "a.card[href]",
        "a.promo[href]",
        ".card a[href]",
        ".promo a[href]",
        ".headline a[href]",
        "article a[href]",
    ]
    .iter()
    .map(|s| Selector::parse(s).unwrap())
    .collect()
});

static ALL_ANCHORS: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Decide whether an absolute URL plausibly points at an article.
///
/// Rejects media/document extensions, navigation/legal/auth/fragment links,
/// non-HTTP schemes, section-style paths, and shallow paths ending in `/`.
/// Accepts a `/YYYY/MM/DD/` path, a known news keyword segment, a long
/// hyphenated slug, or anchor text of at least four words.
pub fn is_probable_article(href: &str, anchor_text: &str) -> bool {
    let Some(parsed) = fetchable(href) else {
        return false;
    };
    let path = parsed.path();
    if SECTION_HINTS.iter().any(|seg| path.contains(seg)) {
        return false;
    }
    if path.ends_with('/') && path.matches('/').count() <= 3 {
        return false;
    }

    DATE_PATH.is_match(path)
        || POSITIVE_SIGNS.iter().any(|k| parsed.as_str().contains(k))
        || is_long_slug(path)
        || word_count(anchor_text) >= 4
}

/// Parse `href` as a lowercase http(s) URL unless it is a media file or a
/// navigation/legal/auth/fragment link.
fn fetchable(href: &str) -> Option<Url> {
    let href_l = href.trim().to_ascii_lowercase();
    if href_l.is_empty() || BAD_SUBSTRINGS.iter().any(|b| href_l.contains(b)) {
        return None;
    }
    let parsed = Url::parse(&href_l).ok()?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return None;
    }
    if BAD_EXT.is_match(&href_l) || BAD_EXT.is_match(parsed.path()) {
        return None;
    }
    Some(parsed)
}

fn is_long_slug(path: &str) -> bool {
    path.matches('-').count() >= 2 && path.chars().count() > 25
}

/// Ordered, deduplicated collector capped at `limit`.
struct Collector {
    limit: usize,
    seen: HashSet<String>,
    links: Vec<CandidateLink>,
}

impl Collector {
    fn new(limit: usize) -> Self {
        Self {
            limit,
            seen: HashSet::new(),
            links: Vec::new(),
        }
    }

    fn full(&self) -> bool {
        self.links.len() >= self.limit
    }

    fn push(&mut self, url: String, anchor_text: String) {
        if self.full() || !self.seen.insert(url.clone()) {
            return;
        }
        let order = self.links.len();
        self.links.push(CandidateLink {
            url,
            anchor_text,
            order,
        });
    }
}

/// Extract up to `limit` candidate article links from a listing page.
///
/// Relative hrefs are resolved against `base_url`. The result keeps discovery
/// order and contains no duplicate URLs.
#[instrument(level = "info", skip(html), fields(bytes = html.len()))]
pub fn classify(html: &str, base_url: &str, limit: usize) -> Vec<CandidateLink> {
    let Ok(base) = Url::parse(base_url) else {
        debug!("Unparseable base URL");
        return Vec::new();
    };
    let document = Html::parse_document(html);
    let mut out = Collector::new(limit);

    let resolve = |href: &str| -> Option<String> {
        let mut url = base.join(href.trim()).ok()?;
        if url.fragment() == Some("") {
            url.set_fragment(None);
        }
        Some(url.to_string())
    };

    let filtered = |out: &mut Collector, selector: &Selector| {
        for a in document.select(selector) {
            if out.full() {
                return;
            }
            let Some(full) = a.value().attr("href").and_then(&resolve) else {
                continue;
            };
            let text = element_text(&a);
            if is_probable_article(&full, &text) {
                out.push(full, text);
            }
        }
    };

    filtered(&mut out, &HEADING_ANCHORS);
    let after_headings = out.links.len();
    for selector in CARD_ANCHORS.iter() {
        filtered(&mut out, selector);
    }
    let after_cards = out.links.len();
    filtered(&mut out, &ALL_ANCHORS);
    let after_all = out.links.len();

    for a in document.select(&ALL_ANCHORS) {
        if out.full() {
            break;
        }
        let Some(full) = a.value().attr("href").and_then(&resolve) else {
            continue;
        };
        let is_slug = fetchable(&full).is_some_and(|u| is_long_slug(u.path()));
        if is_slug {
            out.push(full, element_text(&a));
        }
    }

    info!(
        headings = after_headings,
        cards = after_cards - after_headings,
        anchors = after_all - after_cards,
        slugs = out.links.len() - after_all,
        total = out.links.len(),
        "Classified listing links"
    );
    out.links
}
