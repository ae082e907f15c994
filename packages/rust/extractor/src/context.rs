//! Page-context construction: title, URL classification, metadata and the
//! budgeted excerpt, bundled into a [`PageContext`].

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, instrument, warn};

use sparkle_shared::{PageContext, QuickContext, UNTITLED_PAGE, host_of, take_chars};

use crate::classifier::classify;
use crate::document::{DocumentView, MetaTag};
use crate::extract::{ExtractOptions, extract_with};

/// Cap on a harvested metadata value.
const META_VALUE_CHARS: usize = 200;

/// Cap on `og:description`, which is re-read after the generic pass.
const OG_DESCRIPTION_CHARS: usize = 300;

/// Title reported by [`scrape_quick_context`] when the page has none.
const QUICK_UNTITLED: &str = "Untitled";

/// Collect `key → content` from meta tags, each value length-capped.
///
/// Later tags overwrite earlier ones with the same key. Open Graph title and
/// description are then re-read from the first tag carrying that property.
pub fn harvest_metadata(tags: &[MetaTag]) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();

    for tag in tags {
        if let Some(key) = tag.key() {
            if !tag.content.is_empty() {
                metadata.insert(
                    key.to_string(),
                    take_chars(&tag.content, META_VALUE_CHARS).to_string(),
                );
            }
        }
    }

    for (property, cap) in [
        ("og:title", META_VALUE_CHARS),
        ("og:description", OG_DESCRIPTION_CHARS),
    ] {
        let found = tags
            .iter()
            .find(|t| t.property.as_deref() == Some(property))
            .filter(|t| !t.content.is_empty());
        if let Some(tag) = found {
            metadata.insert(property.to_string(), take_chars(&tag.content, cap).to_string());
        }
    }

    metadata
}

/// Build the full context for a page.
#[instrument(skip(doc, opts), fields(max_tokens = opts.max_tokens))]
pub fn scrape_page_context(doc: &dyn DocumentView, url: &str, opts: &ExtractOptions) -> PageContext {
    let start = Instant::now();

    let title = doc.title().unwrap_or_else(|| UNTITLED_PAGE.to_string());
    let source_type = classify(url);
    let text_content = extract_with(doc, opts);
    let metadata = harvest_metadata(&doc.meta_tags());

    let context = PageContext::new(title, url, source_type, text_content, metadata);

    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
    if elapsed_ms > opts.latency_budget_ms as f64 * 0.5 {
        warn!(
            elapsed_ms = elapsed_ms.round(),
            budget_ms = opts.latency_budget_ms,
            "context scraping is slow"
        );
    }

    debug!(
        source_type = %context.source_type,
        token_count = context.token_count,
        metadata = context.metadata.len(),
        "page context built"
    );

    context
}

/// Title, URL and classification only, without extraction.
pub fn scrape_quick_context(doc: &dyn DocumentView, url: &str) -> QuickContext {
    QuickContext {
        title: doc.title().unwrap_or_else(|| QUICK_UNTITLED.to_string()),
        url: url.to_string(),
        domain: host_of(url),
        source_type: classify(url),
    }
}
