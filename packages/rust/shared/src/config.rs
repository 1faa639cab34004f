//! Application configuration for ao3recs.
//!
//! Nothing is read implicitly: a TOML file is only loaded when the user passes
//! one. CLI flags override file values, which override defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{RecsError, Result};

/// Default archive the recommendations are crawled from.
pub const DEFAULT_BASE_URL: &str = "https://archiveofourown.org";

// ---------------------------------------------------------------------------
// Config structs (TOML schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Where and how pages are fetched.
    #[serde(default)]
    pub archive: ArchiveSection,

    /// Limits applied by the recommendation strategies.
    #[serde(default)]
    pub recommend: RecommendSection,
}

/// `[archive]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveSection {
    /// Site root, e.g. `https://archiveofourown.org`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// User-Agent header sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Ask for Mature/Explicit works to be shown without the interstitial.
    #[serde(default = "default_true")]
    pub view_adult: bool,
}

impl Default for ArchiveSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            view_adult: true,
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("ao3recs/", env!("CARGO_PKG_VERSION")).into()
}
fn default_true() -> bool {
    true
}

/// `[recommend]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendSection {
    /// Stop the co-bookmarker strategy after this many recommendations.
    #[serde(default = "default_cap")]
    pub co_bookmarker_cap: usize,

    /// Number of recommendations the tag-similarity search tries to reach.
    #[serde(default = "default_cap")]
    pub tag_search_quota: usize,
}

impl Default for RecommendSection {
    fn default() -> Self {
        Self {
            co_bookmarker_cap: default_cap(),
            tag_search_quota: default_cap(),
        }
    }
}

fn default_cap() -> usize {
    5
}

// ---------------------------------------------------------------------------
// Runtime config (merged from config file + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime archive configuration with a validated base URL.
#[derive(Debug, Clone)]
pub struct ArchiveConfig {
    pub base_url: Url,
    pub timeout_secs: u64,
    pub user_agent: String,
    pub view_adult: bool,
}

impl TryFrom<&AppConfig> for ArchiveConfig {
    type Error = RecsError;

    fn try_from(config: &AppConfig) -> Result<Self> {
        let base_url = Url::parse(&config.archive.base_url).map_err(|e| {
            RecsError::config(format!(
                "invalid archive base_url '{}': {e}",
                config.archive.base_url
            ))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(RecsError::config(format!(
                "archive base_url '{base_url}' cannot be used as a base"
            )));
        }

        Ok(Self {
            base_url,
            timeout_secs: config.archive.timeout_secs,
            user_agent: config.archive.user_agent.clone(),
            view_adult: config.archive.view_adult,
        })
    }
}

/// Runtime limits for the recommendation strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendConfig {
    pub co_bookmarker_cap: usize,
    pub tag_search_quota: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for RecommendConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            co_bookmarker_cap: config.recommend.co_bookmarker_cap,
            tag_search_quota: config.recommend.tag_search_quota,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| RecsError::io(path, e))?;

    let config = toml::from_str(&content).map_err(|e| {
        RecsError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    tracing::debug!(?path, "loaded config file");

    Ok(config)
}
