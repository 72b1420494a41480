//! # Hybrid News Scraper
//!
//! Discovers article links on news listing pages, extracts title, body,
//! publication time and language from each article, and stores the results
//! in SQLite alongside per-run CSV and JSON Lines exports.
//!
//! ## Usage
//!
//! ```sh
//! hybrid_news_scraper --mode train --per-site 3
//! hybrid_news_scraper --mode test --schedule --cron "0 0 8 * * *"
//! ```
//!
//! ## Architecture
//!
//! 1. **Discovery**: fetch each listing page and classify its links
//! 2. **Extraction**: fetch candidates and run the site-specific or generic strategy
//! 3. **Persistence**: upsert accepted articles keyed by URL
//! 4. **Export**: write `news_hybrid_{training,testing}.{csv,jsonl}`
//!
//! With `--schedule` the whole run repeats on the cron schedule until Ctrl-C.
//! Logs go to stderr and to `scraper.log` (see `--log-file`).

use clap::Parser;
use itertools::Itertools;
use std::error::Error;
use std::time::Duration;
use tracing::{debug, error, info, instrument};

mod cli;
mod dates;
mod error;
mod fetch;
mod language;
mod links;
mod logging;
mod models;
mod outputs;
mod pipeline;
mod schedule;
mod scrapers;
mod sites;
mod storage;
mod utils;

use cli::Cli;
use fetch::{FetchAsync, HttpFetcher, RetryFetch};
use models::Site;
use pipeline::{Pacing, Pipeline};
use scrapers::StrategyRegistry;
use storage::ArticleStore;
use utils::ensure_writable_dir;

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    // --- Tracing init ---
    let _log_guard = logging::init(args.log_path())?;

    info!("hybrid_news_scraper starting up");
    debug!(?args, "Parsed CLI arguments");

    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    let sites = sites::load_sites(args.sites_file.as_deref(), args.mode).await?;
    let fetcher = RetryFetch::new(
        HttpFetcher::new(Duration::from_secs(args.timeout_secs))?,
        args.retries,
    );
    let pipeline = Pipeline::new(fetcher, StrategyRegistry::with_builtin_sites(), args.per_site)
        .with_pacing(Pacing::from_millis(args.pause_min_ms, args.pause_max_ms))
        .with_site_concurrency(args.site_concurrency);
    let store = ArticleStore::new(&args.database_url);

    if args.schedule {
        let (p, s, st, a) = (&pipeline, &sites, &store, &args);
        schedule::run_scheduled(&args.cron, move || run_once(p, s, st, a)).await?;
    } else {
        run_once(&pipeline, &sites, &store, &args).await;
    }

    info!("hybrid_news_scraper finished");
    Ok(())
}

/// One full scrape: crawl, export, persist, report.
///
/// Export and storage failures are logged; they never end the process.
#[instrument(level = "info", skip_all, fields(mode = args.mode.name()))]
async fn run_once<F: FetchAsync>(
    pipeline: &Pipeline<F>,
    sites: &[Site],
    store: &ArticleStore,
    args: &Cli,
) {
    let start_time = std::time::Instant::now();
    let run = pipeline.run(sites).await;
    let articles = run.articles();

    let by_language: Vec<(&str, usize)> = articles
        .iter()
        .map(|a| a.language())
        .counts()
        .into_iter()
        .sorted()
        .collect();
    debug!(?by_language, "Language breakdown");

    match outputs::write_exports(&args.output_dir, args.mode.export_stem(), &articles).await {
        Ok(Some(paths)) => debug!(?paths, "Exports updated"),
        Ok(None) => {}
        Err(e) => error!(path = %args.output_dir, error = %e, "Failed to write exports"),
    }

    let persisted = store.upsert(&articles).await;
    info!(
        found = articles.len(),
        persisted,
        sites = run.sites.len(),
        elapsed_s = start_time.elapsed().as_secs(),
        "Run complete"
    );
}
