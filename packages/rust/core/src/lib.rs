//! Enrichment logic for Sparkle.
//!
//! Scores page context, selects a persona, assembles the enriched prompt,
//! validates it, and serves all of this behind the request boundary.

pub mod assembler;
pub mod bridge;
pub mod persona;
pub mod scoring;
pub mod validator;

pub use assembler::{EnrichOptions, enrich_prompt, enrich_prompt_with, platform_hint, quick_enrich};
pub use bridge::{EnhanceHandler, EnhanceRequest, EnhanceResponse, ExtensionMessage};
pub use persona::persona_for;
pub use scoring::{calculate_context_score, level_from_score, level_from_token_count};
pub use validator::{ValidationReport, ValidationThresholds, validate_enriched_prompt, validate_with};
