//! Application configuration for KeywordForge.
//!
//! User config lives at `~/.keywordforge/keywordforge.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "keywordforge.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".keywordforge";

// ---------------------------------------------------------------------------
// Config structs (matching keywordforge.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Batch processing limits and timeouts.
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Per-user request throttling.
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Embedding model selection.
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// Web search settings for outline research.
    #[serde(default)]
    pub search: SearchConfig,

    /// Local database location.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Report output settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// `[processing]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Hard cap on keywords accepted into one batch (excess is truncated).
    #[serde(default = "default_max_keywords")]
    pub max_keywords_per_batch: usize,

    /// Upper bound on cluster count per batch.
    #[serde(default = "default_max_groups")]
    pub max_groups_per_batch: usize,

    /// Per-group ceiling for outline research calls, in seconds.
    #[serde(default = "default_outline_timeout")]
    pub outline_timeout_secs: u64,

    /// Processing lock TTL, in seconds. A crashed run's lock expires after
    /// this long instead of blocking the batch forever.
    #[serde(default = "default_lock_ttl")]
    pub lock_ttl_secs: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_keywords_per_batch: default_max_keywords(),
            max_groups_per_batch: default_max_groups(),
            outline_timeout_secs: default_outline_timeout(),
            lock_ttl_secs: default_lock_ttl(),
        }
    }
}

fn default_max_keywords() -> usize {
    1000
}
fn default_max_groups() -> usize {
    20
}
fn default_outline_timeout() -> u64 {
    30
}
fn default_lock_ttl() -> u64 {
    1800
}

/// `[rate_limit]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per user per window.
    #[serde(default = "default_rate_limit_requests")]
    pub max_requests: u64,

    /// Window length in seconds.
    #[serde(default = "default_rate_limit_window")]
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_rate_limit_requests(),
            window_secs: default_rate_limit_window(),
        }
    }
}

fn default_rate_limit_requests() -> u64 {
    10
}
fn default_rate_limit_window() -> u64 {
    900
}

/// `[embedding]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding backend: "feature-hash" (built in, deterministic) or a
    /// sentence-transformer model name when the `embeddings` feature is on.
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Vector dimension for the feature-hash backend.
    #[serde(default = "default_embedding_dimension")]
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: default_embedding_model(),
            dimension: default_embedding_dimension(),
        }
    }
}

fn default_embedding_model() -> String {
    "feature-hash".into()
}
fn default_embedding_dimension() -> usize {
    256
}

/// `[search]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// SERP-style JSON endpoint queried during outline research.
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    /// Name of the env var holding the API key (never store the key itself).
    /// When the var is unset, research falls back to deterministic offline
    /// results.
    #[serde(default = "default_search_api_key_env")]
    pub api_key_env: String,

    /// How many ranked results to request per query.
    #[serde(default = "default_search_result_count")]
    pub result_count: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            api_key_env: default_search_api_key_env(),
            result_count: default_search_result_count(),
        }
    }
}

fn default_search_endpoint() -> String {
    "https://serpapi.com/search".into()
}
fn default_search_api_key_env() -> String {
    "KEYWORDFORGE_SEARCH_API_KEY".into()
}
fn default_search_result_count() -> usize {
    5
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the libsql database file. `~` expands to the user's home.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "~/.keywordforge/keywordforge.db".into()
}

/// `[report]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Directory rendered report artifacts are written to.
    #[serde(default = "default_report_output_dir")]
    pub output_dir: String,

    /// Whether completed reports are handed off for email delivery.
    #[serde(default)]
    pub email_enabled: bool,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_report_output_dir(),
            email_enabled: false,
        }
    }
}

fn default_report_output_dir() -> String {
    "~/.keywordforge/reports".into()
}

// ---------------------------------------------------------------------------
// Pipeline config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime pipeline configuration handed to the orchestrator and its
/// collaborators. Derived from [`AppConfig`]; no component reads global
/// state.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Hard cap on keywords accepted into one batch.
    pub max_keywords_per_batch: usize,
    /// Upper bound on cluster count per batch.
    pub max_groups_per_batch: usize,
    /// Per-group ceiling for outline research calls.
    pub outline_timeout: Duration,
    /// Processing lock TTL.
    pub lock_ttl: Duration,
    /// Requests allowed per user per window.
    pub rate_limit_max: u64,
    /// Rate-limit window length.
    pub rate_limit_window: Duration,
}

impl From<&AppConfig> for PipelineConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_keywords_per_batch: config.processing.max_keywords_per_batch,
            max_groups_per_batch: config.processing.max_groups_per_batch,
            outline_timeout: Duration::from_secs(config.processing.outline_timeout_secs),
            lock_ttl: Duration::from_secs(config.processing.lock_ttl_secs),
            rate_limit_max: config.rate_limit.max_requests,
            rate_limit_window: Duration::from_secs(config.rate_limit.window_secs),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.keywordforge/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| PipelineError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.keywordforge/keywordforge.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| PipelineError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| PipelineError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| PipelineError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| PipelineError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the search API key from the configured env var.
/// Returns `None` when unset or empty; research then runs offline.
pub fn search_api_key(config: &AppConfig) -> Option<String> {
    match std::env::var(&config.search.api_key_env) {
        Ok(val) if !val.is_empty() => Some(val),
        _ => None,
    }
}

/// Expand a leading `~/` to the user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| PipelineError::config("could not determine home directory"))?;
        Ok(home.join(rest))
    } else {
        Ok(PathBuf::from(path))
    }
}
