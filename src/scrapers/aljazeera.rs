//! Al Jazeera strategy, covering both the Arabic (`aljazeera.net`) and the
//! English (`aljazeera.com`) editions.

use super::{ExtractionStrategy, SiteMarkup};
use crate::error::Rejection;
use crate::models::Article;
use scraper::Html;

const MARKUP: SiteMarkup = SiteMarkup {
    body: "div.wysiwyg p, article p",
    min_paragraph: 30,
    published: &[("time[datetime]", "datetime")],
};

#[derive(Debug, Default, Clone, Copy)]
pub struct AlJazeera;

impl ExtractionStrategy for AlJazeera {
    fn name(&self) -> &'static str {
        "aljazeera"
    }

    fn extract(&self, url: &str, document: &Html) -> Result<Article, Rejection> {
        MARKUP.extract(url, document)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_pages::page;
    use super::*;

    const ARABIC: &str = "أعلنت الحكومة اليوم عن خطة جديدة لتطوير البنية التحتية في المدن \
        الكبرى، وتشمل الخطة إنشاء طرق وجسور جديدة خلال السنوات الخمس المقبلة.";

    #[test]
    fn test_arabic_article_detects_language() {
        let html = page(
            "",
            &format!(
                "<h1>الحكومة تعلن خطة جديدة للبنية التحتية</h1>\
                 <div class='wysiwyg'><p>{ARABIC}</p><p>{ARABIC}</p></div>\
                 <time datetime='2024-06-01T09:00:00+03:00'>1/6/2024</time>"
            ),
        );
        let doc = Html::parse_document(&html);
        let article = AlJazeera
            .extract("https://www.aljazeera.net/news/2024/6/1/plan", &doc)
            .unwrap();
        assert_eq!(article.language(), "ar");
        assert_eq!(article.published_text().as_deref(), Some("2024-06-01 06:00:00"));
        assert_eq!(article.source(), "aljazeera.net");
    }
}
