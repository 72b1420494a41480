//! HTTP page fetching with identity rotation and bounded retries.
//!
//! # Architecture
//!
//! - [`FetchAsync`]: core trait, "give me the page at this URL"
//! - [`HttpFetcher`]: `reqwest` implementation with a per-request timeout and a
//!   User-Agent drawn from [`USER_AGENTS`] on every attempt
//! - [`RetryFetch`]: decorator that retries any [`FetchAsync`] implementation
//!
//! # Retry Strategy
//!
//! - 2 extra attempts by default (3 requests total)
//! - Delay between attempts: `min(base * 2^(attempt-1), max) + jitter`, with a
//!   1 second base and up to 1 second of random jitter
//! - Network errors and non-200 responses are both retried; once attempts run
//!   out the caller gets [`FetchError::Exhausted`] and nothing finer

use crate::error::FetchError;
use rand::seq::IndexedRandom;
use rand::{Rng, rng};
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::fmt;
use std::time::{Duration as StdDuration, Instant};
use tokio::time::sleep;
use tracing::{debug, error, instrument, warn};

/// Browser identities rotated across requests.
pub const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/115.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0.3 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/88.0.4324.96 Safari/537.36",
];

/// Pick a User-Agent at random from [`USER_AGENTS`].
pub fn pick_user_agent() -> &'static str {
    USER_AGENTS.choose(&mut rng()).copied().unwrap_or(USER_AGENTS[0])
}

/// A successfully fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub content: String,
    pub status: u16,
}

/// Something that can fetch a page by URL.
pub trait FetchAsync {
    /// Fetch `url`, returning the body of a 200 response.
    async fn fetch(&self, url: &str) -> Result<Page, FetchError>;
}

/// Plain `reqwest` fetcher. One request per call, no retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher whose requests time out after `timeout`.
    pub fn new(timeout: StdDuration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl FetchAsync for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, pick_user_agent())
            .header(ACCEPT, "text/html,application/xhtml+xml")
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.8")
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        let content = response.text().await?;
        debug!(
            bytes = content.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(Page {
            content,
            status: status.as_u16(),
        })
    }
}

/// Wrapper that adds jittered exponential backoff to any [`FetchAsync`] implementation.
pub struct RetryFetch<T> {
    /// The underlying fetcher.
    inner: T,
    /// Extra attempts after the first one.
    max_retries: usize,
    /// Delay before the first retry (doubles with each attempt).
    base_delay: StdDuration,
    /// Cap on the exponential part of the delay.
    max_delay: StdDuration,
    /// Upper bound of the random jitter added to every delay.
    max_jitter: StdDuration,
}

impl<T> RetryFetch<T>
where
    T: FetchAsync,
{
    /// Wrap `inner` with `max_retries` extra attempts and a 1s base delay.
    pub fn new(inner: T, max_retries: usize) -> Self {
        Self {
            inner,
            max_retries,
            base_delay: StdDuration::from_secs(1),
            max_delay: StdDuration::from_secs(8),
            max_jitter: StdDuration::from_secs(1),
        }
    }

    /// Override the backoff timings.
    pub fn with_backoff(mut self, base_delay: StdDuration, max_jitter: StdDuration) -> Self {
        self.base_delay = base_delay;
        self.max_jitter = max_jitter;
        self
    }

    fn delay_for(&self, attempt: usize) -> StdDuration {
        let shift = (attempt.saturating_sub(1)).min(16) as u32;
        let delay = self.base_delay.saturating_mul(1 << shift).min(self.max_delay);
        let jitter_cap = self.max_jitter.as_millis() as u64;
        let jitter_ms = if jitter_cap == 0 {
            0
        } else {
            rng().random_range(0..=jitter_cap)
        };
        delay + StdDuration::from_millis(jitter_ms)
    }
}

impl<T> fmt::Debug for RetryFetch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryFetch")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .field("max_jitter", &self.max_jitter)
            .finish()
    }
}

impl<T> FetchAsync for RetryFetch<T>
where
    T: FetchAsync,
{
    #[instrument(level = "info", skip(self))]
    async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
        let total_t0 = Instant::now();
        let mut attempt = 0usize;

        loop {
            match self.inner.fetch(url).await {
                Ok(page) => return Ok(page),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.max_retries {
                        error!(
                            attempt,
                            max = self.max_retries,
                            elapsed_ms_total = total_t0.elapsed().as_millis() as u64,
                            error = %e,
                            "fetch exhausted retries"
                        );
                        return Err(FetchError::Exhausted {
                            url: url.to_string(),
                            attempts: attempt,
                            last: Box::new(e),
                        });
                    }

                    let delay = self.delay_for(attempt);
                    warn!(
                        attempt,
                        max = self.max_retries,
                        ?delay,
                        error = %e,
                        "fetch attempt failed; backing off"
                    );
                    sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Fails with a 503 for the first `failures` calls, then succeeds.
    struct Flaky {
        failures: usize,
        calls: AtomicUsize,
    }

    impl FetchAsync for Flaky {
        async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err(FetchError::Status {
                    status: 503,
                    url: url.to_string(),
                })
            } else {
                Ok(Page {
                    content: "<html></html>".to_string(),
                    status: 200,
                })
            }
        }
    }

    fn quick(inner: Flaky, retries: usize) -> RetryFetch<Flaky> {
        RetryFetch::new(inner, retries).with_backoff(StdDuration::ZERO, StdDuration::ZERO)
    }

    #[tokio::test]
    async fn test_retry_recovers_within_bound() {
        let fetcher = quick(
            Flaky {
                failures: 2,
                calls: AtomicUsize::new(0),
            },
            2,
        );
        let page = fetcher.fetch("https://example.com").await.unwrap();
        assert_eq!(page.status, 200);
        assert_eq!(fetcher.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_bound() {
        let fetcher = quick(
            Flaky {
                failures: 10,
                calls: AtomicUsize::new(0),
            },
            2,
        );
        let err = fetcher.fetch("https://example.com").await.unwrap_err();
        assert!(matches!(err, FetchError::Exhausted { attempts: 3, .. }));
        assert_eq!(fetcher.inner.calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_default_backoff_is_at_least_one_second() {
        let fetcher = RetryFetch::new(
            Flaky {
                failures: 0,
                calls: AtomicUsize::new(0),
            },
            2,
        );
        for attempt in 1..=3 {
            let d = fetcher.delay_for(attempt);
            assert!(d >= StdDuration::from_secs(1));
            assert!(d <= StdDuration::from_secs(9));
        }
    }

    #[test]
    fn test_pick_user_agent_from_pool() {
        for _ in 0..20 {
            assert!(USER_AGENTS.contains(&pick_user_agent()));
        }
    }
}
