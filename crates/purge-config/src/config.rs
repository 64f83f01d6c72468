use purge_models::Category;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use crate::paths::PathManager;

pub const DEFAULT_API_BASE: &str = "https://api.torbox.app/v1/api";

/// Per-request timeout. Not configurable.
pub const REQUEST_TIMEOUT_SECS: u64 = 300;

const CATEGORIES_ENV: &str = "FILES_TYPES";
const STALL_THRESHOLD_ENV: &str = "STALL_THRESHOLD_TORBOX";
const ETA_THRESHOLD_ENV: &str = "ETA_THRESHOLD_TORBOX";
const CHECK_INTERVAL_ENV: &str = "CHECK_INTERVAL_TORBOX";
const API_BASE_ENV: &str = "TORBOX_API_BASE";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Categories to sweep, in fetch order. Required.
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub thresholds: ThresholdConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThresholdConfig {
    /// Age after which an item in a stuck state is removed
    #[serde(default = "default_stall_seconds")]
    pub stall_seconds: u64,
    /// Age after which an item still downloading is removed
    #[serde(default = "default_eta_seconds")]
    pub eta_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchedulerConfig {
    #[serde(default = "default_check_interval_seconds")]
    pub check_interval_seconds: u64,
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_true() -> bool {
    true
}

fn default_stall_seconds() -> u64 {
    2 * 60 * 60 // 2 hours
}

fn default_eta_seconds() -> u64 {
    24 * 60 * 60 // 24 hours
}

fn default_check_interval_seconds() -> u64 {
    10 * 60 // 10 minutes
}

fn default_base_url() -> String {
    DEFAULT_API_BASE.to_string()
}

fn default_page_size() -> usize {
    1000
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            stall_seconds: default_stall_seconds(),
            eta_seconds: default_eta_seconds(),
        }
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            check_interval_seconds: default_check_interval_seconds(),
            run_on_startup: default_true(),
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_size: default_page_size(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            categories: Vec::new(), // No default - must be set explicitly
            thresholds: ThresholdConfig::default(),
            scheduler: SchedulerConfig::default(),
            api: ApiConfig::default(),
        }
    }
}

impl Config {
    /// Load `config.toml` (defaults when absent) and apply environment overrides
    pub fn load(path_manager: &PathManager) -> anyhow::Result<Self> {
        let config_file = path_manager.config_file();
        let mut config = if config_file.exists() {
            Self::load_from_file(&config_file)?
        } else {
            debug!(
                path = %config_file.display(),
                "No config file found, using defaults"
            );
            Self::default()
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn load_from_file(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path.display(), e))?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn apply_env_overrides(&mut self) -> anyhow::Result<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from the container environment
    /// (`FILES_TYPES`, `STALL_THRESHOLD_TORBOX`, ...). Empty values are ignored.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(value) = get(CATEGORIES_ENV) {
            self.categories = Category::parse_list(&value)
                .map_err(|e| anyhow::anyhow!("Invalid {}: {}", CATEGORIES_ENV, e))?;
        }
        if let Some(value) = get(STALL_THRESHOLD_ENV) {
            self.thresholds.stall_seconds = parse_seconds(STALL_THRESHOLD_ENV, &value)?;
        }
        if let Some(value) = get(ETA_THRESHOLD_ENV) {
            self.thresholds.eta_seconds = parse_seconds(ETA_THRESHOLD_ENV, &value)?;
        }
        if let Some(value) = get(CHECK_INTERVAL_ENV) {
            self.scheduler.check_interval_seconds = parse_seconds(CHECK_INTERVAL_ENV, &value)?;
        }
        if let Some(value) = get(API_BASE_ENV) {
            self.api.base_url = value.trim().to_string();
        }
        Ok(())
    }

    /// Refuse configurations the cleanup task cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.categories.is_empty() {
            return Err(anyhow::anyhow!(
                "categories is required and cannot be empty (set it in config.toml or via {})",
                CATEGORIES_ENV
            ));
        }
        if self.thresholds.stall_seconds == 0 {
            return Err(anyhow::anyhow!("thresholds.stall_seconds must be greater than zero"));
        }
        if self.thresholds.eta_seconds == 0 {
            return Err(anyhow::anyhow!("thresholds.eta_seconds must be greater than zero"));
        }
        if self.scheduler.check_interval_seconds == 0 {
            return Err(anyhow::anyhow!("scheduler.check_interval_seconds must be greater than zero"));
        }
        if self.api.page_size == 0 {
            return Err(anyhow::anyhow!("api.page_size must be greater than zero"));
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(anyhow::anyhow!("api.base_url must be an http(s) URL: {}", self.api.base_url));
        }
        Ok(())
    }
}

fn parse_seconds(key: &str, value: &str) -> anyhow::Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| anyhow::anyhow!("{} must be a whole number of seconds, got '{}'", key, value))
}
