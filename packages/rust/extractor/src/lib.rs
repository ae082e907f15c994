//! Page classification and context extraction.
//!
//! This crate provides:
//! - [`classifier`]: URL → [`SourceType`](sparkle_shared::SourceType) and chat platform
//! - [`document`]: Read-only document views (HTML via `scraper`, or a plain snapshot)
//! - [`extract`]: Priority-ordered, token-budgeted excerpt pipeline
//! - [`context`]: Metadata harvesting and [`PageContext`](sparkle_shared::PageContext) construction

pub mod classifier;
pub mod context;
pub mod document;
pub mod extract;

pub use classifier::{classify, detect_platform, is_supported_platform};
pub use context::{harvest_metadata, scrape_page_context, scrape_quick_context};
pub use document::{DocumentSnapshot, DocumentView, HtmlDocument, MetaTag};
pub use extract::{
    CodeBlockStage, ExtractOptions, ExtractPipeline, ExtractStage, HeadingStage, ParagraphStage,
    Placement, SelectionStage, StageOutput, extract, extract_with,
};
