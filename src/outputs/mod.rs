//! Per-run export files.
//!
//! Every run writes the same accepted articles twice, side by side:
//!
//! ```text
//! output_dir/
//! ├── news_hybrid_training.csv     # header + one row per article
//! └── news_hybrid_training.jsonl   # one JSON object per line
//! ```
//!
//! Both use the column order `url, title, body, published, length, source,
//! language`, with `published` in canonical `YYYY-MM-DD HH:MM:SS` UTC text.
//! Files are overwritten on each run that extracted at least one article; a
//! run with nothing to show leaves the previous files in place.

pub mod csv;
pub mod jsonl;

use crate::models::Article;
use serde::Serialize;
use std::error::Error;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Flat export view of an [`Article`]. Field order is the column order.
#[derive(Debug, Serialize)]
pub struct ExportRow<'a> {
    pub url: &'a str,
    pub title: &'a str,
    pub body: &'a str,
    pub published: Option<String>,
    pub length: usize,
    pub source: &'a str,
    pub language: &'a str,
}

impl<'a> From<&'a Article> for ExportRow<'a> {
    fn from(a: &'a Article) -> Self {
        Self {
            url: a.url(),
            title: a.title(),
            body: a.body(),
            published: a.published_text(),
            length: a.length(),
            source: a.source(),
            language: a.language(),
        }
    }
}

/// Paths written by [`write_exports`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPaths {
    pub csv: PathBuf,
    pub jsonl: PathBuf,
}

/// Write `{stem}.csv` and `{stem}.jsonl` into `output_dir`.
///
/// An empty batch writes nothing and returns `Ok(None)`.
#[instrument(level = "info", skip(articles), fields(count = articles.len()))]
pub async fn write_exports(
    output_dir: &str,
    stem: &str,
    articles: &[Article],
) -> Result<Option<ExportPaths>, Box<dyn Error>> {
    if articles.is_empty() {
        warn!(
            "No articles were extracted; check site blocking or heuristics. Keeping previous exports"
        );
        return Ok(None);
    }
    let dir = Path::new(output_dir);
    let paths = ExportPaths {
        csv: dir.join(format!("{stem}.csv")),
        jsonl: dir.join(format!("{stem}.jsonl")),
    };
    csv::write_csv(&paths.csv, articles).await?;
    jsonl::write_jsonl(&paths.jsonl, articles).await?;
    info!(csv = %paths.csv.display(), jsonl = %paths.jsonl.display(), "Wrote exports");
    Ok(Some(paths))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::models::Article;
    use chrono::{TimeZone, Utc};

    pub fn articles() -> Vec<Article> {
        vec![
            Article::new(
                "https://www.example.com/2024/01/05/bridge",
                "Bridge opens, finally",
                "The \"new\" bridge opened on Friday.\nTraffic was light.",
                Some(Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap()),
                "en",
            ),
            Article::new(
                "https://example.org/news/storm",
                "Storm reaches the coast",
                "Heavy rain fell overnight across the region.",
                None,
                "",
            ),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_exports_names_files_by_stem() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        let paths = write_exports(out, "news_hybrid_testing", &fixtures::articles())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(paths.csv, dir.path().join("news_hybrid_testing.csv"));
        assert!(paths.csv.exists());
        assert!(paths.jsonl.exists());
    }

    #[tokio::test]
    async fn test_empty_batch_keeps_previous_exports() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        let paths = write_exports(out, "news_hybrid_training", &fixtures::articles())
            .await
            .unwrap()
            .unwrap();
        let csv_before = tokio::fs::read_to_string(&paths.csv).await.unwrap();
        let jsonl_before = tokio::fs::read_to_string(&paths.jsonl).await.unwrap();

        let second = write_exports(out, "news_hybrid_training", &[]).await.unwrap();
        assert!(second.is_none());
        assert_eq!(tokio::fs::read_to_string(&paths.csv).await.unwrap(), csv_before);
        assert_eq!(tokio::fs::read_to_string(&paths.jsonl).await.unwrap(), jsonl_before);
        assert_eq!(jsonl_before.lines().count(), 2);
    }

    #[tokio::test]
    async fn test_empty_first_run_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().to_str().unwrap();
        assert!(write_exports(out, "news_hybrid_testing", &[]).await.unwrap().is_none());
        assert!(!dir.path().join("news_hybrid_testing.csv").exists());
        assert!(!dir.path().join("news_hybrid_testing.jsonl").exists());
    }

    #[test]
    fn test_export_row_uses_canonical_published() {
        let articles = fixtures::articles();
        let row = ExportRow::from(&articles[0]);
        assert_eq!(row.published.as_deref(), Some("2024-01-05 12:00:00"));
        assert_eq!(row.source, "example.com");
        assert_eq!(ExportRow::from(&articles[1]).language, "unknown");
    }
}
