//! Tabular export.

use super::ExportRow;
use crate::models::Article;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};

/// Serialize `articles` as CSV with a header row.
///
/// The header is written even when there are no articles.
pub fn to_csv(articles: &[Article]) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut writer = ::csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(["url", "title", "body", "published", "length", "source", "language"])?;
    for article in articles {
        writer.serialize(ExportRow::from(article))?;
    }
    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

#[instrument(level = "info", skip(articles), fields(path = %path.display()))]
pub async fn write_csv(path: &Path, articles: &[Article]) -> Result<(), Box<dyn Error>> {
    let bytes = to_csv(articles)?;
    debug!(bytes = bytes.len(), "Writing CSV");
    fs::write(path, bytes).await?;
    Ok(())
}
