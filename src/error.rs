//! Error types for each failure class in the pipeline.
//!
//! None of these abort a run. Fetch failures and rejections are logged per
//! link, storage failures are logged per batch, and the run moves on.
//!
//! - [`FetchError`]: network error, timeout, or non-200 status
//! - [`Rejection`]: a page was fetched but did not meet the quality thresholds
//! - [`StoreError`]: the article table could not be written

use thiserror::Error;

/// Transport-level failure while fetching a page.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, TLS, timeout or body decoding failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with something other than 200.
    #[error("non-200 status {status} for {url}")]
    Status { status: u16, url: String },

    /// Every attempt failed; `last` is the final cause.
    #[error("gave up on {url} after {attempts} attempts: {last}")]
    Exhausted {
        url: String,
        attempts: usize,
        last: Box<FetchError>,
    },
}

/// Why an extraction strategy declined to produce an [`Article`](crate::models::Article).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("no title found")]
    MissingTitle,

    #[error("title too short ({words} words)")]
    ShortTitle { words: usize },

    #[error("insufficient body (paragraphs={paragraphs}, chars={chars})")]
    ThinBody { paragraphs: usize, chars: usize },
}

/// Failure while writing to the article store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_messages_carry_counts() {
        let r = Rejection::ThinBody {
            paragraphs: 1,
            chars: 42,
        };
        assert_eq!(r.to_string(), "insufficient body (paragraphs=1, chars=42)");
        assert_eq!(
            Rejection::ShortTitle { words: 2 }.to_string(),
            "title too short (2 words)"
        );
    }

    #[test]
    fn test_exhausted_wraps_last_cause() {
        let e = FetchError::Exhausted {
            url: "https://example.com/a".to_string(),
            attempts: 3,
            last: Box::new(FetchError::Status {
                status: 503,
                url: "https://example.com/a".to_string(),
            }),
        };
        let msg = e.to_string();
        assert!(msg.contains("after 3 attempts"));
        assert!(msg.contains("503"));
    }
}
