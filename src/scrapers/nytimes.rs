//! New York Times strategy.

use super::{ExtractionStrategy, SiteMarkup};
use crate::error::Rejection;
use crate::models::Article;
use scraper::Html;

const MARKUP: SiteMarkup = SiteMarkup {
    body: "section[name='articleBody'] p, .css-53u6y8 p, article p",
    min_paragraph: 30,
    published: &[
        ("meta[name='ptime']", "content"),
        ("meta[property='article:published']", "content"),
        ("time[datetime]", "datetime"),
    ],
};

/// Strategy for `nytimes.com`.
#[derive(Debug, Default, Clone, Copy)]
pub struct NyTimes;

impl ExtractionStrategy for NyTimes {
    fn name(&self) -> &'static str {
        "nytimes"
    }

    fn extract(&self, url: &str, document: &Html) -> Result<Article, Rejection> {
        MARKUP.extract(url, document)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_pages::{PARA, page};
    use super::*;

    #[test]
    fn test_ptime_meta_wins_over_time_element() {
        let html = page(
            r#"<meta name="ptime" content="20240315093000">
               <meta property="article:published" content="2024-03-16T08:00:00-04:00">"#,
            &format!(
                "<h1>City council approves budget plan</h1>\
                 <time datetime=\"2020-01-01\">old</time>\
                 <section name='articleBody'><p>{PARA}</p><p>{PARA}</p></section>"
            ),
        );
        let doc = Html::parse_document(&html);
        let article = NyTimes
            .extract("https://www.nytimes.com/2024/03/15/nyregion/budget.html", &doc)
            .unwrap();
        assert_eq!(article.published_text().as_deref(), Some("2024-03-15 09:30:00"));
        assert_eq!(article.language(), "en");
    }

    #[test]
    fn test_paywall_stub_is_rejected() {
        let html = page(
            "",
            "<h1>City council approves budget plan</h1>\
             <article><p>Subscribe to continue reading this story.</p></article>",
        );
        let doc = Html::parse_document(&html);
        assert!(matches!(
            NyTimes.extract("https://www.nytimes.com/2024/03/15/nyregion/budget.html", &doc),
            Err(Rejection::ThinBody { paragraphs: 1, .. })
        ));
    }
}
