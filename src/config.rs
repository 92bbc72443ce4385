//! TOML configuration parsing and validation.
//!
//! ```toml
//! [db]
//! path = "./data/edihub.sqlite"
//!
//! [server]
//! bind = "127.0.0.1:8000"
//!
//! [search]
//! default_limit = 10
//! default_threshold = 0.7
//! candidate_limit = 100
//!
//! [search.weights]
//! lexical = 0.60
//! project = 0.20
//! priority = 0.20
//! ```
//!
//! Only `[db]` and `[server]` are required; every `[search]` key falls back
//! to the ranking defaults from `edihub-core`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use edihub_core::models::DEFAULT_LIST_LIMIT;
use edihub_core::search::{RankingWeights, SearchParams, DEFAULT_LIMIT, DEFAULT_THRESHOLD};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
    #[serde(default)]
    pub search: SearchConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DbConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SearchConfig {
    /// Result cap when a request omits `limite`.
    #[serde(default = "default_limit")]
    pub default_limit: usize,
    /// Acceptance threshold when a request omits `threshold`.
    #[serde(default = "default_threshold")]
    pub default_threshold: f64,
    /// Page size of the candidate fetch per entity kind.
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: i64,
    #[serde(default)]
    pub weights: RankingWeights,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_LIMIT,
            default_threshold: DEFAULT_THRESHOLD,
            candidate_limit: DEFAULT_LIST_LIMIT,
            weights: RankingWeights::default(),
        }
    }
}

impl SearchConfig {
    pub fn params(&self) -> SearchParams {
        SearchParams {
            weights: self.weights.clone(),
            candidate_limit: self.candidate_limit,
        }
    }
}

fn default_limit() -> usize {
    DEFAULT_LIMIT
}
fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}
fn default_candidate_limit() -> i64 {
    DEFAULT_LIST_LIMIT
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &Config) -> Result<()> {
    let search = &config.search;

    if search.default_limit < 1 {
        anyhow::bail!("search.default_limit must be >= 1");
    }

    if search.candidate_limit < 1 {
        anyhow::bail!("search.candidate_limit must be >= 1");
    }

    if !(0.0..=1.0).contains(&search.default_threshold) {
        anyhow::bail!("search.default_threshold must be in [0.0, 1.0]");
    }

    for (key, value) in search.weights.entries() {
        if !(0.0..=1.0).contains(&value) {
            anyhow::bail!("search.weights.{} must be in [0.0, 1.0]", key);
        }
    }

    if config.server.bind.trim().is_empty() {
        anyhow::bail!("server.bind must not be empty");
    }

    Ok(())
}
