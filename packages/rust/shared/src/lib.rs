//! Shared types, error model, and configuration for Sparkle.
//!
//! This crate is the foundation depended on by all other Sparkle crates.
//! It provides:
//! - [`SparkleError`]: the unified error type
//! - Domain types ([`PageContext`], [`SourceType`], [`Platform`], [`BehemothPrompt`], ...)
//! - Token estimation and truncation ([`estimate_tokens`], [`truncate_to_token_budget`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod tokens;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, EnrichmentConfig, ExtractionConfig, LimitsConfig, ValidationConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{Result, SparkleError};
pub use tokens::{
    CHARS_PER_TOKEN, TRUNCATION_MARKER, estimate_tokens, take_chars, truncate_to_token_budget,
};
pub use types::{
    BehemothPrompt, ContextLevel, ExpertPersona, LATENCY_BUDGET_MS, MAX_CHARS, MAX_TOKENS,
    PageContext, Platform, QuickContext, SourceType, UNTITLED_PAGE, UserIntent, expansion_ratio,
    host_of,
};
