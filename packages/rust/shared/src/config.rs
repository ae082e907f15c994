//! Application configuration for Sparkle.
//!
//! User config lives at `~/.sparkle/sparkle.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SparkleError};
use crate::types::{LATENCY_BUDGET_MS, MAX_TOKENS, Platform};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "sparkle.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".sparkle";

// ---------------------------------------------------------------------------
// Config structs (matching sparkle.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Token and latency budgets.
    #[serde(default)]
    pub limits: LimitsConfig,

    /// Per-tier extraction caps.
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Prompt assembly settings.
    #[serde(default)]
    pub enrichment: EnrichmentConfig,

    /// Quality thresholds for the validator.
    #[serde(default)]
    pub validation: ValidationConfig,
}

/// `[limits]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Token budget for harvested page text.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Wall-clock budget for one enrichment.
    #[serde(default = "default_latency_budget_ms")]
    pub latency_budget_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_tokens: default_max_tokens(),
            latency_budget_ms: default_latency_budget_ms(),
        }
    }
}

fn default_max_tokens() -> usize {
    MAX_TOKENS
}
fn default_latency_budget_ms() -> u64 {
    LATENCY_BUDGET_MS
}

/// `[extraction]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Cap on a single code block, in tokens.
    #[serde(default = "default_code_block_tokens")]
    pub code_block_tokens: usize,

    /// Cap on the active selection, in tokens.
    #[serde(default = "default_selection_tokens")]
    pub selection_tokens: usize,

    /// Paragraphs must be longer than this to be harvested.
    #[serde(default = "default_min_paragraph_chars")]
    pub min_paragraph_chars: usize,

    /// Selections must be longer than this to be harvested.
    #[serde(default = "default_min_selection_chars")]
    pub min_selection_chars: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            code_block_tokens: default_code_block_tokens(),
            selection_tokens: default_selection_tokens(),
            min_paragraph_chars: default_min_paragraph_chars(),
            min_selection_chars: default_min_selection_chars(),
        }
    }
}

fn default_code_block_tokens() -> usize {
    500
}
fn default_selection_tokens() -> usize {
    300
}
fn default_min_paragraph_chars() -> usize {
    50
}
fn default_min_selection_chars() -> usize {
    10
}

/// `[enrichment]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentConfig {
    /// Platform assumed when a request names none.
    #[serde(default)]
    pub default_platform: Platform,

    /// Leading chars of page text quoted into the prompt.
    #[serde(default = "default_content_excerpt_chars")]
    pub content_excerpt_chars: usize,

    /// Page text is quoted only above this token count.
    #[serde(default = "default_min_content_tokens")]
    pub min_content_tokens: usize,

    /// Cap on each quoted metadata value.
    #[serde(default = "default_meta_value_chars")]
    pub meta_value_chars: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            default_platform: Platform::Unknown,
            content_excerpt_chars: default_content_excerpt_chars(),
            min_content_tokens: default_min_content_tokens(),
            meta_value_chars: default_meta_value_chars(),
        }
    }
}

fn default_content_excerpt_chars() -> usize {
    2000
}
fn default_min_content_tokens() -> usize {
    50
}
fn default_meta_value_chars() -> usize {
    150
}

/// `[validation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Minimum acceptable expansion ratio.
    #[serde(default = "default_min_expansion_ratio")]
    pub min_expansion_ratio: f64,

    /// Minimum acceptable enriched prompt length, in chars.
    #[serde(default = "default_min_enriched_chars")]
    pub min_enriched_chars: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            min_expansion_ratio: default_min_expansion_ratio(),
            min_enriched_chars: default_min_enriched_chars(),
        }
    }
}

fn default_min_expansion_ratio() -> f64 {
    4.0
}
fn default_min_enriched_chars() -> usize {
    200
}

impl AppConfig {
    /// Reject values that would make the pipeline meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.limits.max_tokens == 0 {
            return Err(SparkleError::config("limits.max_tokens must be positive"));
        }
        if self.limits.latency_budget_ms == 0 {
            return Err(SparkleError::config(
                "limits.latency_budget_ms must be positive",
            ));
        }
        if !self.validation.min_expansion_ratio.is_finite()
            || self.validation.min_expansion_ratio < 0.0
        {
            return Err(SparkleError::config(
                "validation.min_expansion_ratio must be a non-negative number",
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.sparkle/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| SparkleError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.sparkle/sparkle.toml`).
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
    let content = std::fs::read_to_string(path).map_err(|e| SparkleError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        SparkleError::config(format!("failed to parse {}: {e}", path.display()))
    })?;
    config.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SparkleError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SparkleError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SparkleError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
