//! Priority-ordered, token-budgeted text extraction.
//!
//! Extraction runs a fixed list of [`ExtractStage`]s. Each stage receives the
//! budget still remaining and reports what it produced and how much of the
//! budget it consumed; [`ExtractPipeline::run`] is the one place the running
//! total is kept, so a budgeted stage can never push it past `max_tokens`.
//!
//! A part is charged as rendered, prefix included, plus one separator. The
//! budgeted tiers therefore always satisfy
//! `estimate_tokens(output) <= max_tokens`.

use tracing::{debug, instrument};

use sparkle_shared::{
    AppConfig, CHARS_PER_TOKEN, LATENCY_BUDGET_MS, MAX_TOKENS, truncate_to_token_budget,
};

use crate::document::DocumentView;

/// Separator between harvested parts.
const PART_SEPARATOR: &str = "\n\n";

const HEADING_PREFIX: &str = "[Heading] ";
const CODE_PREFIX: &str = "[Code]\n";
const SELECTION_PREFIX: &str = "[Selected Text] ";

/// Tokens charged for a rendered part and the separator that may follow it.
fn part_cost(part: &str) -> usize {
    (part.chars().count() + PART_SEPARATOR.len()).div_ceil(CHARS_PER_TOKEN)
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Runtime extraction settings, merged from config.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Total token budget for budgeted stages.
    pub max_tokens: usize,
    /// Cap on a single code block, in tokens.
    pub code_block_tokens: usize,
    /// Cap on the selection, in tokens.
    pub selection_tokens: usize,
    /// Paragraphs must be longer than this many chars.
    pub min_paragraph_chars: usize,
    /// Selections must be longer than this many chars.
    pub min_selection_chars: usize,
    /// Used only to flag slow context construction.
    pub latency_budget_ms: u64,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            max_tokens: MAX_TOKENS,
            code_block_tokens: 500,
            selection_tokens: 300,
            min_paragraph_chars: 50,
            min_selection_chars: 10,
            latency_budget_ms: LATENCY_BUDGET_MS,
        }
    }
}

impl From<&AppConfig> for ExtractOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            max_tokens: config.limits.max_tokens,
            code_block_tokens: config.extraction.code_block_tokens,
            selection_tokens: config.extraction.selection_tokens,
            min_paragraph_chars: config.extraction.min_paragraph_chars,
            min_selection_chars: config.extraction.min_selection_chars,
            latency_budget_ms: config.limits.latency_budget_ms,
        }
    }
}

// ---------------------------------------------------------------------------
// Stage trait
// ---------------------------------------------------------------------------

/// Where a stage's parts land relative to what earlier stages produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Append,
    Prepend,
}

/// What one stage harvested.
#[derive(Debug, Clone, Default)]
pub struct StageOutput {
    /// Rendered parts, in order.
    pub parts: Vec<String>,
    /// Tokens charged against the budget.
    pub consumed: usize,
}

impl StageOutput {
    /// Push `part` if its cost still fits in `remaining`.
    fn push_if_fits(&mut self, part: String, remaining: usize) -> bool {
        let tokens = part_cost(&part);
        if self.consumed + tokens > remaining {
            return false;
        }
        self.parts.push(part);
        self.consumed += tokens;
        true
    }
}

/// One tier of the extraction priority order.
pub trait ExtractStage: Send + Sync {
    /// Human-readable stage name for tracing.
    fn name(&self) -> &str;

    /// Where this stage's output is placed.
    fn placement(&self) -> Placement {
        Placement::Append
    }

    /// Whether this stage is held to the running budget.
    fn budgeted(&self) -> bool {
        true
    }

    /// Harvest from `doc` within `remaining` tokens.
    fn run(&self, doc: &dyn DocumentView, remaining: usize, opts: &ExtractOptions) -> StageOutput;
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

/// Headings, each whole or not at all.
pub struct HeadingStage;

impl ExtractStage for HeadingStage {
    fn name(&self) -> &str {
        "headings"
    }

    fn run(&self, doc: &dyn DocumentView, remaining: usize, _opts: &ExtractOptions) -> StageOutput {
        let mut out = StageOutput::default();
        for raw in doc.headings() {
            let text = raw.trim();
            if text.is_empty() || out.consumed >= remaining {
                continue;
            }
            // A heading that does not fit is skipped; later, shorter ones may still fit.
            out.push_if_fits(format!("{HEADING_PREFIX}{text}"), remaining);
        }
        out
    }
}

/// Code blocks, each truncated to the per-block cap.
pub struct CodeBlockStage;

impl ExtractStage for CodeBlockStage {
    fn name(&self) -> &str {
        "code_blocks"
    }

    fn run(&self, doc: &dyn DocumentView, remaining: usize, opts: &ExtractOptions) -> StageOutput {
        let mut out = StageOutput::default();
        for raw in doc.code_blocks() {
            let text = raw.trim();
            if text.is_empty() || out.consumed >= remaining {
                continue;
            }
            // Leave room for the prefix and separator around the body.
            let overhead = CODE_PREFIX.len() + PART_SEPARATOR.len();
            let room = ((remaining - out.consumed) * CHARS_PER_TOKEN).saturating_sub(overhead);
            let cap = opts.code_block_tokens.min(room / CHARS_PER_TOKEN);
            let truncated = truncate_to_token_budget(text, cap);
            out.push_if_fits(format!("{CODE_PREFIX}{truncated}"), remaining);
        }
        out
    }
}

/// Substantial paragraphs from the main-content region, verbatim.
pub struct ParagraphStage;

impl ExtractStage for ParagraphStage {
    fn name(&self) -> &str {
        "paragraphs"
    }

    fn run(&self, doc: &dyn DocumentView, remaining: usize, opts: &ExtractOptions) -> StageOutput {
        let mut out = StageOutput::default();
        if remaining == 0 {
            return out;
        }
        let Some(paragraphs) = doc.main_paragraphs() else {
            return out;
        };
        for raw in paragraphs {
            let text = raw.trim();
            if text.chars().count() <= opts.min_paragraph_chars || out.consumed >= remaining {
                continue;
            }
            out.push_if_fits(text.to_string(), remaining);
        }
        out
    }
}

/// The active selection, placed ahead of everything else.
///
/// Not held to the running budget: a selection is always included, capped
/// only by its own limit.
pub struct SelectionStage;

impl ExtractStage for SelectionStage {
    fn name(&self) -> &str {
        "selection"
    }

    fn placement(&self) -> Placement {
        Placement::Prepend
    }

    fn budgeted(&self) -> bool {
        false
    }

    fn run(&self, doc: &dyn DocumentView, _remaining: usize, opts: &ExtractOptions) -> StageOutput {
        let mut out = StageOutput::default();
        let Some(raw) = doc.selection() else {
            return out;
        };
        let text = raw.trim();
        if text.chars().count() <= opts.min_selection_chars {
            return out;
        }
        let truncated =
            truncate_to_token_budget(text, opts.selection_tokens.min(opts.max_tokens));
        let part = format!("{SELECTION_PREFIX}{truncated}");
        out.consumed = part_cost(&part);
        out.parts.push(part);
        out
    }
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// Holds extraction stages in priority order.
pub struct ExtractPipeline {
    stages: Vec<Box<dyn ExtractStage>>,
}

impl ExtractPipeline {
    /// Create a pipeline with the built-in stages:
    /// headings, code blocks, paragraphs, selection.
    pub fn new() -> Self {
        Self {
            stages: vec![
                Box::new(HeadingStage),
                Box::new(CodeBlockStage),
                Box::new(ParagraphStage),
                Box::new(SelectionStage),
            ],
        }
    }

    /// Run every stage and join their parts.
    pub fn run(&self, doc: &dyn DocumentView, opts: &ExtractOptions) -> String {
        let mut parts: Vec<String> = Vec::new();
        let mut used = 0usize;

        for stage in &self.stages {
            let remaining = opts.max_tokens.saturating_sub(used);
            let output = stage.run(doc, remaining, opts);

            if stage.budgeted() {
                debug_assert!(
                    output.consumed <= remaining,
                    "stage {} overspent its budget",
                    stage.name()
                );
                used += output.consumed.min(remaining);
            }

            debug!(
                stage = stage.name(),
                parts = output.parts.len(),
                consumed = output.consumed,
                used,
                max_tokens = opts.max_tokens,
                "extraction stage complete"
            );

            match stage.placement() {
                Placement::Append => parts.extend(output.parts),
                Placement::Prepend => {
                    parts.splice(0..0, output.parts);
                }
            }
        }

        parts.join(PART_SEPARATOR)
    }
}

impl Default for ExtractPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract a budgeted excerpt from `doc` with default stage caps.
pub fn extract(doc: &dyn DocumentView, max_tokens: usize) -> String {
    extract_with(
        doc,
        &ExtractOptions {
            max_tokens,
            ..ExtractOptions::default()
        },
    )
}

/// Extract a budgeted excerpt from `doc` with explicit options.
#[instrument(skip_all, fields(max_tokens = opts.max_tokens))]
pub fn extract_with(doc: &dyn DocumentView, opts: &ExtractOptions) -> String {
    ExtractPipeline::new().run(doc, opts)
}
