//! Run orchestration: listing page → candidate links → articles.
//!
//! Each site goes through the same steps:
//!
//! ```text
//! fetch listing → classify links → for each link { fetch → extract → accept | reject }
//! ```
//!
//! Extraction stops once the per-site cap is reached. A site whose listing
//! fails to load or yields no links is logged and skipped; nothing a single
//! site or link does can end the run.
//!
//! # Pacing
//!
//! Article fetches within a site are serial with a random pause between
//! them. Sites themselves may run concurrently (`site_concurrency`), and the
//! resulting reports keep configuration order.

use crate::fetch::FetchAsync;
use crate::links;
use crate::models::{LinkOutcome, Outcome, ScrapeRun, Site, SiteReport};
use crate::scrapers::StrategyRegistry;
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt};
use rand::{Rng, rng};
use std::time::{Duration, Instant};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Links pulled from a listing page per article wanted.
pub const CANDIDATE_MULTIPLIER: usize = 8;

/// Random pause bounds between article fetches within one site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub min: Duration,
    pub max: Duration,
}

impl Pacing {
    pub fn from_millis(min_ms: u64, max_ms: u64) -> Self {
        let (lo, hi) = if min_ms <= max_ms {
            (min_ms, max_ms)
        } else {
            (max_ms, min_ms)
        };
        Self {
            min: Duration::from_millis(lo),
            max: Duration::from_millis(hi),
        }
    }

    /// No pauses at all.
    pub fn none() -> Self {
        Self::from_millis(0, 0)
    }

    fn pick(&self) -> Duration {
        let lo = self.min.as_millis() as u64;
        let hi = self.max.as_millis() as u64;
        if hi == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rng().random_range(lo..=hi))
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::from_millis(1000, 2000)
    }
}

/// Orchestrates one scrape run over a list of sites.
pub struct Pipeline<F> {
    fetcher: F,
    registry: StrategyRegistry,
    per_site: usize,
    pacing: Pacing,
    site_concurrency: usize,
}

impl<F> Pipeline<F>
where
    F: FetchAsync,
{
    /// A sequential pipeline extracting at most `per_site` articles per site.
    pub fn new(fetcher: F, registry: StrategyRegistry, per_site: usize) -> Self {
        Self {
            fetcher,
            registry,
            per_site,
            pacing: Pacing::default(),
            site_concurrency: 1,
        }
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    /// Crawl up to `n` sites at once. Zero is treated as one.
    pub fn with_site_concurrency(mut self, n: usize) -> Self {
        self.site_concurrency = n.max(1);
        self
    }

    /// Crawl every site and collect the per-site reports in input order.
    #[instrument(level = "info", skip_all, fields(sites = sites.len(), per_site = self.per_site))]
    pub async fn run(&self, sites: &[Site]) -> ScrapeRun {
        let t0 = Instant::now();
        let reports: Vec<SiteReport> = stream::iter(sites)
            .map(|site| self.scrape_site(site))
            .buffered(self.site_concurrency)
            .collect()
            .await;
        let run = ScrapeRun { sites: reports };
        info!(
            articles = run.articles().len(),
            candidates = run.candidates(),
            rejected = run.count_where(|o| matches!(o, Outcome::Rejected(_))),
            fetch_failed = run.count_where(|o| matches!(o, Outcome::FetchFailed)),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Scrape run finished"
        );
        run
    }

    #[instrument(level = "info", skip_all, fields(site = %site.url))]
    async fn scrape_site(&self, site: &Site) -> SiteReport {
        let mut report = SiteReport {
            site: site.url.clone(),
            ..SiteReport::default()
        };

        let listing = match self.fetcher.fetch(&site.url).await {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "Listing page unavailable; skipping site");
                return report;
            }
        };

        let candidates = links::classify(
            &listing.content,
            &site.url,
            self.per_site.saturating_mul(CANDIDATE_MULTIPLIER),
        );
        report.candidates = candidates.len();
        if candidates.is_empty() {
            warn!("No candidate links found; skipping site");
            return report;
        }

        for link in &candidates {
            if report.articles.len() >= self.per_site {
                break;
            }
            if !report.outcomes.is_empty() {
                sleep(self.pacing.pick()).await;
            }

            debug!(url = %link.url, anchor = %link.anchor_text, order = link.order, "Trying candidate");
            let outcome = match self.fetcher.fetch(&link.url).await {
                Err(e) => {
                    warn!(url = %link.url, error = %e, "Article fetch failed");
                    Outcome::FetchFailed
                }
                Ok(page) => match self.registry.extract(&link.url, &page.content) {
                    Ok(article) => {
                        info!(
                            url = %link.url,
                            status = page.status,
                            title = %truncate_for_log(article.title(), 80),
                            length = article.length(),
                            language = %article.language(),
                            "Accepted article"
                        );
                        report.articles.push(article);
                        Outcome::Accepted
                    }
                    Err(reason) => {
                        info!(url = %link.url, %reason, "Rejected page");
                        Outcome::Rejected(reason)
                    }
                },
            };
            report.outcomes.push(LinkOutcome {
                url: link.url.clone(),
                outcome,
            });
        }

        info!(
            accepted = report.articles.len(),
            attempted = report.outcomes.len(),
            candidates = report.candidates,
            "Finished site"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, Rejection};
    use crate::fetch::Page;
    use std::collections::HashMap;
    use std::sync::Mutex;

    const SENTENCE: &str = "The regional transport authority said the long awaited bridge \
        would carry about forty thousand vehicles every day once it is fully open.";

    /// Serves canned pages and records every requested URL.
    #[derive(Default)]
    struct MapFetcher {
        pages: HashMap<String, String>,
        requested: Mutex<Vec<String>>,
    }

    impl MapFetcher {
        fn with(mut self, url: &str, html: impl Into<String>) -> Self {
            self.pages.insert(url.to_string(), html.into());
            self
        }

        fn requested(&self) -> Vec<String> {
            self.requested.lock().unwrap().clone()
        }
    }

    impl FetchAsync for MapFetcher {
        async fn fetch(&self, url: &str) -> Result<Page, FetchError> {
            self.requested.lock().unwrap().push(url.to_string());
            match self.pages.get(url) {
                Some(content) => Ok(Page {
                    content: content.clone(),
                    status: 200,
                }),
                None => Err(FetchError::Status {
                    status: 404,
                    url: url.to_string(),
                }),
            }
        }
    }

    fn pipeline(fetcher: MapFetcher, per_site: usize) -> Pipeline<MapFetcher> {
        Pipeline::new(fetcher, StrategyRegistry::with_builtin_sites(), per_site)
            .with_pacing(Pacing::none())
    }

    fn listing(paths: &[&str]) -> String {
        let anchors: String = paths
            .iter()
            .map(|p| format!("<h2><a href=\"{p}\">Story at {p}</a></h2>"))
            .collect();
        format!("<html><body><nav><a href=\"/about\">About</a></nav>{anchors}</body></html>")
    }

    fn article_page(title: &str, paragraphs: usize) -> String {
        let body: String = (0..paragraphs).map(|_| format!("<p>{SENTENCE}</p>")).collect();
        format!(
            "<html><head><meta property=\"og:title\" content=\"{title} | Example News\">\
             <meta property=\"article:published_time\" content=\"2024-01-05T12:00:00Z\">\
             </head><body><article>{body}</article></body></html>"
        )
    }

    #[tokio::test]
    async fn test_end_to_end_single_article() {
        let fetcher = MapFetcher::default()
            .with("https://news.example.com/", listing(&["/2024/01/05/world/bridge-opens"]))
            .with(
                "https://news.example.com/2024/01/05/world/bridge-opens",
                article_page("Bridge opens to traffic after delays", 25),
            );
        let run = pipeline(fetcher, 3)
            .run(&[Site::new("https://news.example.com/")])
            .await;

        let articles = run.articles();
        assert_eq!(articles.len(), 1);
        let a = &articles[0];
        assert_eq!(a.title(), "Bridge opens to traffic after delays");
        assert!(a.body().split_whitespace().count() >= 500);
        assert!(a.length() >= 150);
        assert_eq!(a.published_text().as_deref(), Some("2024-01-05 12:00:00"));
        assert_eq!(a.language(), "en");
        assert_eq!(a.source(), "news.example.com");
    }

    #[tokio::test]
    async fn test_site_without_links_is_skipped() {
        let fetcher = MapFetcher::default()
            .with("https://empty.example.com/", "<html><body><a href=\"#top\">Top</a></body></html>")
            .with("https://news.example.com/", listing(&["/news/one-story"]))
            .with(
                "https://news.example.com/news/one-story",
                article_page("Council approves new budget plan", 3),
            );
        let run = pipeline(fetcher, 3)
            .run(&[
                Site::new("https://empty.example.com/"),
                Site::new("https://news.example.com/"),
            ])
            .await;

        assert_eq!(run.sites.len(), 2);
        assert_eq!(run.sites[0].site, "https://empty.example.com/");
        assert_eq!(run.sites[0].candidates, 0);
        assert!(run.sites[0].outcomes.is_empty());
        assert_eq!(run.sites[1].articles.len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_listing_does_not_stop_run() {
        let fetcher = MapFetcher::default()
            .with("https://news.example.com/", listing(&["/news/one-story"]))
            .with(
                "https://news.example.com/news/one-story",
                article_page("Council approves new budget plan", 3),
            );
        let run = pipeline(fetcher, 3)
            .with_site_concurrency(2)
            .run(&[
                Site::new("https://down.example.com/"),
                Site::new("https://news.example.com/"),
            ])
            .await;
        assert_eq!(run.sites[0].site, "https://down.example.com/");
        assert_eq!(run.articles().len(), 1);
    }

    #[tokio::test]
    async fn test_stops_at_per_site_cap() {
        let paths = ["/news/a", "/news/b", "/news/c", "/news/d", "/news/e"];
        let mut fetcher = MapFetcher::default().with("https://news.example.com/", listing(&paths));
        for p in paths {
            fetcher = fetcher.with(
                &format!("https://news.example.com{p}"),
                article_page("Council approves new budget plan", 3),
            );
        }
        let p = pipeline(fetcher, 2);
        let run = p.run(&[Site::new("https://news.example.com/")]).await;

        assert_eq!(run.sites[0].candidates, 5);
        assert_eq!(run.articles().len(), 2);
        assert_eq!(
            p.fetcher.requested(),
            vec![
                "https://news.example.com/",
                "https://news.example.com/news/a",
                "https://news.example.com/news/b",
            ]
        );
    }

    #[tokio::test]
    async fn test_outcomes_follow_link_order() {
        let fetcher = MapFetcher::default()
            .with(
                "https://news.example.com/",
                listing(&["/news/missing", "/news/thin", "/news/good"]),
            )
            .with(
                "https://news.example.com/news/thin",
                article_page("Council approves new budget plan", 1),
            )
            .with(
                "https://news.example.com/news/good",
                article_page("Council approves new budget plan", 3),
            );
        let run = pipeline(fetcher, 3)
            .run(&[Site::new("https://news.example.com/")])
            .await;

        let outcomes: Vec<&Outcome> = run.sites[0].outcomes.iter().map(|o| &o.outcome).collect();
        assert_eq!(outcomes[0], &Outcome::FetchFailed);
        assert!(matches!(outcomes[1], Outcome::Rejected(Rejection::ThinBody { .. })));
        assert_eq!(outcomes[2], &Outcome::Accepted);
        assert_eq!(run.count_where(|o| matches!(o, Outcome::Accepted)), 1);
    }

    #[test]
    fn test_pacing_bounds() {
        let pacing = Pacing::from_millis(2000, 1000);
        assert_eq!(pacing.min, Duration::from_millis(1000));
        for _ in 0..20 {
            let d = pacing.pick();
            assert!(d >= Duration::from_millis(1000) && d <= Duration::from_millis(2000));
        }
        assert_eq!(Pacing::none().pick(), Duration::ZERO);
    }
}
