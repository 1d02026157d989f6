//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs. Every
//! field has a default, so a missing file runs the tracker with the stock
//! settings. The JustGiving application id is referenced by env-var name
//! and resolved at runtime.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::types::Slot;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub tracker: TrackerConfig,
    pub output: OutputConfig,
    pub api: ApiConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TrackerConfig {
    /// Fundraiser page short name. Prompted for on stdin when unset.
    pub stream_id: Option<String>,
    pub poll_interval_secs: u64,
    pub name_max_length: usize,
    pub page_size: u32,
    pub page_count: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            stream_id: None,
            poll_interval_secs: 5,
            name_max_length: 20,
            page_size: 150,
            page_count: 2,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub total_raised: String,
    pub latest_name: String,
    pub latest_amount: String,
    pub top_name: String,
    pub top_amount: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            total_raised: "totalRaised.txt".into(),
            latest_name: "latestName.txt".into(),
            latest_amount: "latestAmount.txt".into(),
            top_name: "topName.txt".into(),
            top_amount: "topAmount.txt".into(),
        }
    }
}

impl OutputConfig {
    /// File name configured for a slot.
    pub fn file_name(&self, slot: Slot) -> &str {
        match slot {
            Slot::TotalRaised => &self.total_raised,
            Slot::LatestName => &self.latest_name,
            Slot::LatestAmount => &self.latest_amount,
            Slot::TopName => &self.top_name,
            Slot::TopAmount => &self.top_amount,
        }
    }

    /// Full path a slot is written to.
    pub fn path_for(&self, slot: Slot) -> PathBuf {
        self.dir.join(self.file_name(slot))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Name of the env var holding the JustGiving application id.
    pub app_id_env: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.justgiving.com".into(),
            app_id_env: "JUSTGIVING_APP_ID".into(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::parse(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            info!(path, "No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load(path)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}
