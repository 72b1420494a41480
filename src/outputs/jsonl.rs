//! JSON Lines export: one object per accepted article.

use super::ExportRow;
use crate::models::Article;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{debug, instrument};

pub fn to_jsonl(articles: &[Article]) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    for article in articles {
        out.push_str(&serde_json::to_string(&ExportRow::from(article))?);
        out.push('\n');
    }
    Ok(out)
}

#[instrument(level = "info", skip(articles), fields(path = %path.display()))]
pub async fn write_jsonl(path: &Path, articles: &[Article]) -> Result<(), Box<dyn Error>> {
    let text = to_jsonl(articles)?;
    debug!(bytes = text.len(), "Writing JSON Lines");
    fs::write(path, text).await?;
    Ok(())
}
