//! Named site lists selected by the run mode.
//!
//! The built-in lists can be replaced with a YAML catalog mapping a mode name
//! to seed URLs:
//!
//! ```yaml
//! train:
//!   - https://www.independent.co.uk
//!   - https://www.dw.com
//! test:
//!   - https://www.bbc.com/news
//! ```

use crate::cli::Mode;
use crate::models::Site;
use std::collections::HashMap;
use std::error::Error;
use tracing::{info, instrument};

/// Listing pages crawled in `train` mode; all go through the generic extractor.
pub const TRAINING_SITES: &[&str] = &[
    "https://www.independent.co.uk",
    "https://www.chinadaily.com.cn",
    "https://www.japantimes.co.jp",
    "https://www.france24.com",
    "https://www.dw.com",
    "https://www.haaretz.com",
    "https://www.scmp.com",
    "https://www.lemonde.fr",
    "https://www.latimes.com",
    "https://www.timesofindia.com",
];

/// Listing pages crawled in `test` mode, mostly outlets with a site-specific strategy.
pub const TESTING_SITES: &[&str] = &[
    "https://edition.cnn.com",
    "https://www.bbc.com/news",
    "https://www.nytimes.com",
    "https://www.theguardian.com/international",
    "https://www.reuters.com",
    "https://www.aljazeera.net",
    "https://www.npr.org",
    "https://www.theglobeandmail.com",
];

/// Mode name to seed URLs, as read from a YAML catalog.
pub type SiteCatalog = HashMap<String, Vec<String>>;

/// Built-in site list for a mode.
pub fn builtin_sites(mode: Mode) -> Vec<Site> {
    let list = match mode {
        Mode::Train => TRAINING_SITES,
        Mode::Test => TESTING_SITES,
    };
    list.iter().map(|u| Site::new(*u)).collect()
}

/// Parse a YAML catalog and pick the list for `mode`.
///
/// A catalog without an entry for the mode yields an empty list.
pub fn sites_from_yaml(yaml: &str, mode: Mode) -> Result<Vec<Site>, serde_yaml::Error> {
    let catalog: SiteCatalog = serde_yaml::from_str(yaml)?;
    Ok(catalog
        .get(mode.name())
        .map(|urls| urls.iter().map(Site::new).collect())
        .unwrap_or_default())
}

/// Resolve the sites for this run: the catalog file when given, else the built-in list.
#[instrument(level = "info", skip_all, fields(mode = mode.name()))]
pub async fn load_sites(sites_file: Option<&str>, mode: Mode) -> Result<Vec<Site>, Box<dyn Error>> {
    let sites = match sites_file {
        Some(path) => {
            let yaml = tokio::fs::read_to_string(path).await?;
            sites_from_yaml(&yaml, mode)?
        }
        None => builtin_sites(mode),
    };
    info!(count = sites.len(), "Loaded site list");
    Ok(sites)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_lists() {
        let train = builtin_sites(Mode::Train);
        assert_eq!(train.len(), TRAINING_SITES.len());
        assert_eq!(train[0].domain, "independent.co.uk");
        let test = builtin_sites(Mode::Test);
        assert_eq!(test[0].domain, "edition.cnn.com");
    }

    #[test]
    fn test_sites_from_yaml() {
        let yaml = "train:\n  - https://www.dw.com\n  - https://www.scmp.com\ntest:\n  - https://www.bbc.com/news\n";
        let sites = sites_from_yaml(yaml, Mode::Train).unwrap();
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[1].domain, "scmp.com");
        let sites = sites_from_yaml(yaml, Mode::Test).unwrap();
        assert_eq!(sites, vec![Site::new("https://www.bbc.com/news")]);
    }

    #[test]
    fn test_sites_from_yaml_missing_mode() {
        let sites = sites_from_yaml("train: []\n", Mode::Test).unwrap();
        assert!(sites.is_empty());
    }

    #[test]
    fn test_sites_from_yaml_invalid() {
        assert!(sites_from_yaml("- just\n- a list\n", Mode::Train).is_err());
    }

    #[tokio::test]
    async fn test_load_sites_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sites.yaml");
        std::fs::write(&path, "test:\n  - https://www.reuters.com\n").unwrap();
        let sites = load_sites(path.to_str(), Mode::Test).await.unwrap();
        assert_eq!(sites, vec![Site::new("https://www.reuters.com")]);
    }
}
