//! Advisory quality checks on an assembled prompt.

use serde::Serialize;

use sparkle_shared::{AppConfig, BehemothPrompt, LATENCY_BUDGET_MS};

/// Thresholds an enriched prompt is checked against.
#[derive(Debug, Clone)]
pub struct ValidationThresholds {
    pub min_expansion_ratio: f64,
    pub latency_budget_ms: u64,
    pub min_enriched_chars: usize,
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            min_expansion_ratio: 4.0,
            latency_budget_ms: LATENCY_BUDGET_MS,
            min_enriched_chars: 200,
        }
    }
}

impl From<&AppConfig> for ValidationThresholds {
    fn from(config: &AppConfig) -> Self {
        Self {
            min_expansion_ratio: config.validation.min_expansion_ratio,
            latency_budget_ms: config.limits.latency_budget_ms,
            min_enriched_chars: config.validation.min_enriched_chars,
        }
    }
}

/// Outcome of validation. `valid` iff `issues` is empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<String>,
}

/// Check `prompt` against the default thresholds.
pub fn validate_enriched_prompt(prompt: &BehemothPrompt) -> ValidationReport {
    validate_with(prompt, &ValidationThresholds::default())
}

/// Check `prompt` against `thresholds`. Every check runs; issues accumulate.
pub fn validate_with(prompt: &BehemothPrompt, thresholds: &ValidationThresholds) -> ValidationReport {
    let mut issues = Vec::new();

    if prompt.expansion_ratio < thresholds.min_expansion_ratio {
        issues.push(format!(
            "Low expansion ratio: {:.1}x (target: >{}x)",
            prompt.expansion_ratio, thresholds.min_expansion_ratio
        ));
    }

    if prompt.processing_time_ms > thresholds.latency_budget_ms as f64 {
        issues.push(format!(
            "Exceeded latency budget: {:.0}ms (budget: {}ms)",
            prompt.processing_time_ms, thresholds.latency_budget_ms
        ));
    }

    let enriched_chars = prompt.enriched.chars().count();
    if enriched_chars < thresholds.min_enriched_chars {
        issues.push(format!(
            "Enriched prompt too short: {enriched_chars} chars (minimum: {})",
            thresholds.min_enriched_chars
        ));
    }

    ValidationReport {
        valid: issues.is_empty(),
        issues,
    }
}
