//! Core domain types for the enrichment pipeline.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::tokens::estimate_tokens;

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Maximum tokens harvested from a page.
pub const MAX_TOKENS: usize = 2000;

/// Character equivalent of [`MAX_TOKENS`].
pub const MAX_CHARS: usize = 8000;

/// Wall-clock budget for one enrichment, in milliseconds.
pub const LATENCY_BUDGET_MS: u64 = 500;

/// Title used when a page has none.
pub const UNTITLED_PAGE: &str = "Untitled Page";

// ---------------------------------------------------------------------------
// SourceType
// ---------------------------------------------------------------------------

/// Coarse content domain of a page, derived once from its URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    Github,
    Arxiv,
    Jira,
    Stackoverflow,
    Docs,
    #[default]
    Generic,
}

impl SourceType {
    /// Every source type, in declaration order.
    pub const ALL: [SourceType; 6] = [
        Self::Github,
        Self::Arxiv,
        Self::Jira,
        Self::Stackoverflow,
        Self::Docs,
        Self::Generic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Github => "github",
            Self::Arxiv => "arxiv",
            Self::Jira => "jira",
            Self::Stackoverflow => "stackoverflow",
            Self::Docs => "docs",
            Self::Generic => "generic",
        }
    }
}

impl fmt::Display for SourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// Target chat platform for the enriched prompt.
///
/// Unrecognised names deserialize and parse as [`Platform::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Platform {
    Chatgpt,
    Claude,
    Gemini,
    #[default]
    Unknown,
}

impl Platform {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chatgpt => "chatgpt",
            Self::Claude => "claude",
            Self::Gemini => "gemini",
            Self::Unknown => "unknown",
        }
    }
}

impl From<&str> for Platform {
    fn from(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "chatgpt" => Self::Chatgpt,
            "claude" => Self::Claude,
            "gemini" => Self::Gemini,
            _ => Self::Unknown,
        }
    }
}

impl From<String> for Platform {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl FromStr for Platform {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// ContextLevel
// ---------------------------------------------------------------------------

/// How much useful page context is available: `Low < Medium < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextLevel {
    Low,
    Medium,
    High,
}

impl ContextLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ContextLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// PageContext
// ---------------------------------------------------------------------------

/// Immutable snapshot of the page surrounding a request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContext {
    pub title: String,
    pub url: String,
    /// Host part of `url` only.
    pub domain: String,
    pub source_type: SourceType,
    /// Budget-truncated excerpt produced by the extractor.
    pub text_content: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    /// Always `estimate_tokens(text_content)` when built through [`PageContext::new`].
    pub token_count: usize,
}

impl PageContext {
    /// Build a context, deriving `domain` from `url` and `token_count` from
    /// `text_content`.
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        source_type: SourceType,
        text_content: impl Into<String>,
        metadata: BTreeMap<String, String>,
    ) -> Self {
        let url = url.into();
        let text_content = text_content.into();
        Self {
            title: title.into(),
            domain: host_of(&url),
            url,
            source_type,
            token_count: estimate_tokens(&text_content),
            text_content,
            metadata,
        }
    }
}

/// Host of a URL, or an empty string when it has none.
pub fn host_of(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_default()
}

/// The title/URL subset of a page, available without extraction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuickContext {
    pub title: String,
    pub url: String,
    pub domain: String,
    pub source_type: SourceType,
}

// ---------------------------------------------------------------------------
// Persona / intent / result
// ---------------------------------------------------------------------------

/// Static descriptor of an expert role used to frame a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpertPersona {
    pub role: &'static str,
    pub expertise: &'static [&'static str],
    pub thinking_style: &'static str,
    pub output_format: &'static str,
}

/// The raw user request, captured when enrichment starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIntent {
    /// Untrimmed text as typed.
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl UserIntent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Result of one enrichment call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BehemothPrompt {
    pub original: UserIntent,
    pub enriched: String,
    pub persona: &'static ExpertPersona,
    pub context: PageContext,
    /// `enriched` length over untrimmed `original.text` length (min 1).
    pub expansion_ratio: f64,
    pub processing_time_ms: f64,
}

/// Ratio of `enriched` to `original` length in chars, with the denominator
/// floored at one.
pub fn expansion_ratio(enriched: &str, original: &str) -> f64 {
    enriched.chars().count() as f64 / original.chars().count().max(1) as f64
}
