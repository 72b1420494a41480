//! SQLite persistence for extracted articles.
//!
//! Each call to [`ArticleStore::upsert`] opens its own connection, runs one
//! transaction and closes the connection again; nothing is held between
//! batches. The table is created on first use.
//!
//! # Merge Rules
//!
//! Rows are keyed by `url`. On conflict every column is replaced by the
//! incoming value except `published`, which keeps the stored timestamp when
//! the incoming one is `NULL`.

use crate::error::StoreError;
use crate::models::Article;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{Connection, QueryBuilder, Sqlite};
use std::str::FromStr;
use tracing::{error, info, instrument, warn};

/// Rows per multi-value `INSERT`; 7 binds each keeps well under SQLite's limit.
const ROWS_PER_STATEMENT: usize = 100;

const CREATE_TABLE: &str = r"
    CREATE TABLE IF NOT EXISTS articles (
        id        INTEGER PRIMARY KEY AUTOINCREMENT,
        url       TEXT NOT NULL UNIQUE,
        title     TEXT NOT NULL,
        body      TEXT NOT NULL,
        published TEXT NULL,
        length    INTEGER NOT NULL,
        source    TEXT,
        language  TEXT
    )
";

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_articles_language_published ON articles (language, published)";

const INSERT_HEAD: &str =
    "INSERT INTO articles (url, title, body, published, length, source, language) ";

const ON_CONFLICT: &str = r"
    ON CONFLICT(url) DO UPDATE SET
        title     = excluded.title,
        body      = excluded.body,
        published = COALESCE(excluded.published, articles.published),
        length    = excluded.length,
        source    = excluded.source,
        language  = excluded.language
";

/// Write gateway for the `articles` table.
#[derive(Debug, Clone)]
pub struct ArticleStore {
    database_url: String,
}

impl ArticleStore {
    /// A store backed by the SQLite database at `database_url`
    /// (for example `sqlite://insightbot.db`). The file is created if missing.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
        }
    }

    /// Insert or update `articles`, returning the number of rows written.
    ///
    /// Never fails: an empty batch is a logged no-op, and a storage error is
    /// logged and reported as zero rows.
    #[instrument(level = "info", skip_all, fields(batch = articles.len()))]
    pub async fn upsert(&self, articles: &[Article]) -> usize {
        if articles.is_empty() {
            info!("No articles to persist");
            return 0;
        }
        match self.try_upsert(articles).await {
            Ok(rows) => {
                info!(rows, "Persisted articles");
                rows
            }
            Err(e) => {
                error!(error = %e, "Persisting batch failed; nothing committed");
                0
            }
        }
    }

    async fn try_upsert(&self, articles: &[Article]) -> Result<usize, StoreError> {
        let mut conn = self.connect().await?;
        let written = write_batch(&mut conn, articles).await;
        if let Err(e) = conn.close().await {
            warn!(error = %e, "Failed to close database connection cleanly");
        }
        written
    }

    async fn connect(&self) -> Result<SqliteConnection, StoreError> {
        let options = SqliteConnectOptions::from_str(&self.database_url)?.create_if_missing(true);
        Ok(SqliteConnection::connect_with(&options).await?)
    }
}

/// Create the schema and upsert every article inside one transaction.
///
/// Dropping the transaction on an early `?` rolls it back.
async fn write_batch(conn: &mut SqliteConnection, articles: &[Article]) -> Result<usize, StoreError> {
    let mut tx = conn.begin().await?;
    sqlx::query(CREATE_TABLE).execute(&mut *tx).await?;
    sqlx::query(CREATE_INDEX).execute(&mut *tx).await?;

    let mut written = 0usize;
    for chunk in articles.chunks(ROWS_PER_STATEMENT) {
        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(INSERT_HEAD);
        qb.push_values(chunk, |mut row, article| {
            row.push_bind(article.url())
                .push_bind(article.title())
                .push_bind(article.body())
                .push_bind(article.published_text())
                .push_bind(article.length() as i64)
                .push_bind(article.source())
                .push_bind(article.language());
        });
        qb.push(ON_CONFLICT);
        written += qb.build().execute(&mut *tx).await?.rows_affected() as usize;
    }

    tx.commit().await?;
    Ok(written)
}
