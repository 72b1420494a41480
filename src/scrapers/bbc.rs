//! BBC News strategy.
//!
//! Body text sits in `RichTextComponentWrapper` blocks on current pages and in
//! `story-body__inner` on older ones. Only paragraphs over 40 characters are
//! kept, which drops image captions and "Related Topics" labels.

use super::{ExtractionStrategy, SiteMarkup};
use crate::error::Rejection;
use crate::models::Article;
use scraper::Html;

const MARKUP: SiteMarkup = SiteMarkup {
    body: "article p, .ssrcss-uf6wea-RichTextComponentWrapper p, .story-body__inner p",
    min_paragraph: 40,
    published: &[("time[datetime]", "datetime")],
};

/// Strategy for `bbc.com` and `bbc.co.uk`.
#[derive(Debug, Default, Clone, Copy)]
pub struct Bbc;

impl ExtractionStrategy for Bbc {
    fn name(&self) -> &'static str {
        "bbc"
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
    fn test_bbc_article() {
        let html = page(
            "<title>Bridge to open next month - BBC News</title>",
            &format!(
                "<article><time datetime=\"2024-04-02T06:15:00.000Z\">2 April</time>\
                 <p>Image caption, The bridge</p><p>{PARA}</p><p>{PARA}</p></article>"
            ),
        );
        let doc = Html::parse_document(&html);
        let article = Bbc.extract("https://www.bbc.co.uk/news/uk-123", &doc).unwrap();
        assert_eq!(article.title(), "Bridge to open next month");
        assert_eq!(article.body(), format!("{PARA} {PARA}"));
        assert_eq!(article.published_text().as_deref(), Some("2024-04-02 06:15:00"));
        assert_eq!(article.source(), "bbc.co.uk");
    }

    #[test]
    fn test_bbc_legacy_layout_without_time() {
        let html = page(
            "",
            &format!(
                "<h1>Bridge to open next month</h1>\
                 <div class='story-body__inner'><p>{PARA}</p><p>{PARA}</p></div>"
            ),
        );
        let doc = Html::parse_document(&html);
        let article = Bbc.extract("https://www.bbc.com/news/uk-123", &doc).unwrap();
        assert_eq!(article.published(), None);
    }
}
