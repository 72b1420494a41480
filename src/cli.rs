//! Command-line interface definitions.
//!
//! All options can be provided via flags; the database URL, cron expression
//! and log file also fall back to environment variables.

use clap::{Parser, ValueEnum};

/// Which named site list to crawl.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Generic-heuristic sites used while tuning thresholds
    Train,
    /// Held-out sites, including the outlets with custom strategies
    Test,
}

impl Mode {
    /// Key used in a YAML site catalog.
    pub fn name(self) -> &'static str {
        match self {
            Mode::Train => "train",
            Mode::Test => "test",
        }
    }

    /// Stem for the export files written by a run in this mode.
    pub fn export_stem(self) -> &'static str {
        match self {
            Mode::Train => "news_hybrid_training",
            Mode::Test => "news_hybrid_testing",
        }
    }
}

/// Command-line arguments for the scraper.
///
/// # Examples
///
/// ```sh
/// # One-shot run over the training sites, 3 articles per site
/// hybrid_news_scraper --mode train --per-site 3
///
/// # Run now, then every day at 08:00 UTC
/// hybrid_news_scraper --mode test --schedule
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Site list to crawl
    #[arg(long, value_enum, default_value_t = Mode::Train)]
    pub mode: Mode,

    /// Maximum articles to extract per site
    #[arg(long, default_value_t = 3)]
    pub per_site: usize,

    /// Keep running and re-scrape on the cron schedule instead of exiting
    #[arg(long)]
    pub schedule: bool,

    /// Cron expression (with seconds, UTC) for scheduled runs
    #[arg(long, env = "SCRAPE_CRON", default_value = "0 0 8 * * *")]
    pub cron: String,

    /// SQLite database URL for the article table
    #[arg(long, env = "DATABASE_URL", default_value = "sqlite://insightbot.db")]
    pub database_url: String,

    /// Directory for the CSV and JSON Lines exports
    #[arg(short, long, default_value = ".")]
    pub output_dir: String,

    /// Optional YAML file mapping mode names to seed URLs
    #[arg(long)]
    pub sites_file: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = 12)]
    pub timeout_secs: u64,

    /// Extra attempts after a failed fetch
    #[arg(long, default_value_t = 2)]
    pub retries: usize,

    /// Number of sites crawled at the same time (fetches within a site stay serial)
    #[arg(long, default_value_t = 4)]
    pub site_concurrency: usize,

    /// Lower bound of the pause between article fetches, in milliseconds
    #[arg(long, default_value_t = 1000)]
    pub pause_min_ms: u64,

    /// Upper bound of the pause between article fetches, in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub pause_max_ms: u64,

    /// File that receives a copy of the log output
    #[arg(long, env = "SCRAPER_LOG", default_value = "scraper.log")]
    pub log_file: String,

    /// Log to stderr only
    #[arg(long)]
    pub no_log_file: bool,
}

impl Cli {
    /// Log file to write alongside stderr, if any.
    pub fn log_path(&self) -> Option<&str> {
        (!self.no_log_file && !self.log_file.is_empty()).then_some(self.log_file.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["hybrid_news_scraper"]);

        assert_eq!(cli.mode, Mode::Train);
        assert_eq!(cli.per_site, 3);
        assert!(!cli.schedule);
        assert_eq!(cli.retries, 2);
        assert_eq!(cli.output_dir, ".");
    }

    #[test]
    fn test_log_file_option() {
        let cli = Cli::parse_from(["hybrid_news_scraper", "--log-file", "logs/run.log"]);
        assert_eq!(cli.log_path(), Some("logs/run.log"));

        let cli = Cli::parse_from(["hybrid_news_scraper", "--no-log-file"]);
        assert_eq!(cli.log_path(), None);
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "hybrid_news_scraper",
            "--mode",
            "test",
            "--per-site",
            "5",
            "--schedule",
            "--database-url",
            "sqlite:///tmp/news.db",
            "-o",
            "/tmp/exports",
        ]);

        assert_eq!(cli.mode, Mode::Test);
        assert_eq!(cli.per_site, 5);
        assert!(cli.schedule);
        assert_eq!(cli.database_url, "sqlite:///tmp/news.db");
        assert_eq!(cli.output_dir, "/tmp/exports");
    }

    #[test]
    fn test_cli_rejects_unknown_mode() {
        assert!(Cli::try_parse_from(["hybrid_news_scraper", "--mode", "prod"]).is_err());
    }

    #[test]
    fn test_mode_names() {
        assert_eq!(Mode::Train.name(), "train");
        assert_eq!(Mode::Test.export_stem(), "news_hybrid_testing");
    }
}
