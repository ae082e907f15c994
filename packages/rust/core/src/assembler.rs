//! Prompt assembler.
//!
//! Composes persona, page context, the user's request and platform guidance
//! into one structured prompt. Assembly is deterministic: identical inputs
//! give identical text. Only the reported timing varies between calls.
//!
//! Layout, blocks separated by blank lines:
//!
//! 1. Persona preamble
//! 2. Reference context (title, URL, source type, metadata, page excerpt)
//! 3. User request
//! 4. Thinking process
//! 5. Platform note (known platforms only)
//! 6. Quality assurance

use std::time::Instant;

use tracing::{debug, instrument, warn};

use sparkle_shared::{
    AppConfig, BehemothPrompt, ExpertPersona, LATENCY_BUDGET_MS, PageContext, Platform,
    SourceType, UserIntent, expansion_ratio, take_chars,
};

use crate::persona::persona_for;

/// Metadata keys quoted in the reference context, in this order.
const GROUNDING_META_KEYS: [&str; 3] = ["description", "og:description", "keywords"];

const QUALITY_ASSURANCE: &str = "## Quality Assurance

After formulating your response:
- Verify accuracy of any technical claims
- Ensure code examples are syntactically correct
- Check for completeness against the original request
- Consider: \"What would a peer reviewer critique?\"";

const QUICK_INSTRUCTIONS: &str = "## Expected Response
Please provide a thorough, well-structured response. Think through the problem step-by-step before answering.";

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// Runtime assembly settings, merged from config.
#[derive(Debug, Clone)]
pub struct EnrichOptions {
    /// Assembly slower than 80% of this is logged.
    pub latency_budget_ms: u64,
    /// Leading chars of page text quoted into the prompt.
    pub content_excerpt_chars: usize,
    /// Page text is quoted only above this token count.
    pub min_content_tokens: usize,
    /// Cap on each quoted metadata value.
    pub meta_value_chars: usize,
}

impl Default for EnrichOptions {
    fn default() -> Self {
        Self {
            latency_budget_ms: LATENCY_BUDGET_MS,
            content_excerpt_chars: 2000,
            min_content_tokens: 50,
            meta_value_chars: 150,
        }
    }
}

impl From<&AppConfig> for EnrichOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            latency_budget_ms: config.limits.latency_budget_ms,
            content_excerpt_chars: config.enrichment.content_excerpt_chars,
            min_content_tokens: config.enrichment.min_content_tokens,
            meta_value_chars: config.enrichment.meta_value_chars,
        }
    }
}

// ---------------------------------------------------------------------------
// Blocks
// ---------------------------------------------------------------------------

/// One sentence of platform-specific guidance, for known platforms only.
pub fn platform_hint(platform: Platform) -> Option<&'static str> {
    match platform {
        Platform::Chatgpt => {
            Some("Leverage GPT's strength in creative problem-solving and code generation.")
        }
        Platform::Claude => Some("Utilize Claude's attention to nuance and comprehensive reasoning."),
        Platform::Gemini => Some(
            "Take advantage of Gemini's multimodal understanding and up-to-date knowledge.",
        ),
        Platform::Unknown => None,
    }
}

fn persona_preamble(persona: &ExpertPersona) -> String {
    format!(
        "You are a {} with deep expertise in {}.\n\
         Your thinking style emphasizes {}.\n\
         Provide responses in {}.",
        persona.role,
        persona.expertise.join(", "),
        persona.thinking_style,
        persona.output_format,
    )
}

fn context_grounding(context: &PageContext, opts: &EnrichOptions) -> String {
    let mut lines = vec![
        "**Reference Context:**".to_string(),
        format!("- Page: \"{}\"", context.title),
        format!("- URL: {}", context.url),
    ];

    if context.source_type != SourceType::Generic {
        lines.push(format!(
            "- Source Type: {}",
            context.source_type.as_str().to_uppercase()
        ));
    }

    for key in GROUNDING_META_KEYS {
        if let Some(value) = context.metadata.get(key).filter(|v| !v.is_empty()) {
            lines.push(format!("- {key}: {}", take_chars(value, opts.meta_value_chars)));
        }
    }

    if !context.text_content.is_empty() && context.token_count > opts.min_content_tokens {
        lines.push("\n**Page Content Summary:**".to_string());
        lines.push("```".to_string());
        lines.push(take_chars(&context.text_content, opts.content_excerpt_chars).to_string());
        lines.push("```".to_string());
    }

    lines.join("\n")
}

fn thinking_process(persona: &ExpertPersona) -> String {
    format!(
        "## Thinking Process\n\n\
         Before responding, I will:\n\
         1. Analyze the core intent and identify key requirements\n\
         2. Consider edge cases and potential ambiguities\n\
         3. Apply {}\n\
         4. Structure my response for maximum clarity\n\n\
         ## My Analysis",
        persona.thinking_style
    )
}

fn compose(
    user_text: &str,
    context: &PageContext,
    platform: Platform,
    persona: &ExpertPersona,
    opts: &EnrichOptions,
) -> String {
    let mut lines: Vec<String> = vec![
        persona_preamble(persona),
        String::new(),
        context_grounding(context, opts),
        String::new(),
        "---".to_string(),
        "## User Request".to_string(),
        String::new(),
        format!("\"{}\"", user_text.trim()),
        String::new(),
        "---".to_string(),
        thinking_process(persona),
    ];

    if let Some(hint) = platform_hint(platform) {
        lines.push(format!("\n*Note: {hint}*"));
    }

    lines.push(String::new());
    lines.push(QUALITY_ASSURANCE.to_string());

    lines.join("\n")
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Enrich `user_text` with default options.
pub fn enrich_prompt(user_text: &str, context: PageContext, platform: Platform) -> BehemothPrompt {
    enrich_prompt_with(user_text, context, platform, &EnrichOptions::default())
}

/// Enrich `user_text` against `context` for `platform`.
///
/// Never fails: sparse contexts only shorten the reference block.
#[instrument(skip_all, fields(source_type = %context.source_type, platform = %platform))]
pub fn enrich_prompt_with(
    user_text: &str,
    context: PageContext,
    platform: Platform,
    opts: &EnrichOptions,
) -> BehemothPrompt {
    let start = Instant::now();

    let original = UserIntent::new(user_text);
    let persona = persona_for(context.source_type);
    let enriched = compose(user_text, &context, platform, persona, opts);
    let ratio = expansion_ratio(&enriched, user_text);

    let processing_time_ms = start.elapsed().as_secs_f64() * 1000.0;
    if processing_time_ms > opts.latency_budget_ms as f64 * 0.8 {
        warn!(
            processing_time_ms = processing_time_ms.round(),
            budget_ms = opts.latency_budget_ms,
            "enrichment is close to its latency budget"
        );
    }

    debug!(
        role = persona.role,
        enriched_len = enriched.len(),
        expansion_ratio = ratio,
        "prompt assembled"
    );

    BehemothPrompt {
        original,
        enriched,
        persona,
        context,
        expansion_ratio: ratio,
        processing_time_ms,
    }
}

/// Minimal enrichment with the generic persona and no page context.
pub fn quick_enrich(user_text: &str) -> String {
    let persona = persona_for(SourceType::Generic);
    format!(
        "{}\n\n## Request\n\"{}\"\n\n{QUICK_INSTRUCTIONS}",
        persona_preamble(persona),
        user_text.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn github_context() -> PageContext {
        PageContext {
            title: "Sample GitHub Repository".into(),
            url: "https://github.com/user/repo".into(),
            domain: "github.com".into(),
            source_type: SourceType::Github,
            text_content: "This is sample code content from a GitHub repository.".into(),
            metadata: BTreeMap::from([
                ("description".into(), "A sample repository for testing".into()),
                ("og:description".into(), "A sample GitHub repo".into()),
                ("keywords".into(), "testing, javascript, typescript".into()),
            ]),
            token_count: 250,
        }
    }

    fn generic_context() -> PageContext {
        PageContext::new(
            "Generic Web Page",
            "https://example.com/page",
            SourceType::Generic,
            "Some generic content here.",
            BTreeMap::new(),
        )
    }

    #[test]
    fn github_request_uses_engineer_persona() {
        let text = "How do I fix this bug?";
        let result = enrich_prompt(text, github_context(), Platform::Chatgpt);

        assert_eq!(result.persona.role, "Senior Software Engineer");
        assert!(result.enriched.contains("How do I fix this bug?"));
        assert!(result.enriched.contains("github.com"));
        assert_eq!(
            result.expansion_ratio,
            result.enriched.chars().count() as f64 / text.chars().count() as f64
        );
        assert!(result.expansion_ratio > 4.0);
        assert_eq!(result.original.text, text);
    }

    #[test]
    fn blocks_appear_in_order() {
        let result = enrich_prompt("Explain the API", github_context(), Platform::Claude);
        let e = &result.enriched;

        let order = [
            "You are a Senior Software Engineer",
            "**Reference Context:**",
            "## User Request",
            "## Thinking Process",
            "*Note: Utilize Claude's",
            "## Quality Assurance",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|marker| e.find(marker).unwrap_or_else(|| panic!("missing {marker}")))
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{positions:?}");
    }

    #[test]
    fn persona_preamble_text() {
        let result = enrich_prompt("q", generic_context(), Platform::Unknown);
        assert!(result.enriched.starts_with(
            "You are a Senior Expert Consultant with deep expertise in analysis, problem-solving, \
             comprehensive explanations, best practices.\n\
             Your thinking style emphasizes thorough analysis considering multiple perspectives.\n\
             Provide responses in well-structured response with actionable insights."
        ));
    }

    #[test]
    fn grounding_includes_source_type_and_metadata() {
        let result = enrich_prompt("Review this", github_context(), Platform::Unknown);
        let e = &result.enriched;
        assert!(e.contains("- Page: \"Sample GitHub Repository\""));
        assert!(e.contains("- URL: https://github.com/user/repo"));
        assert!(e.contains("- Source Type: GITHUB"));
        assert!(e.contains("- description: A sample repository for testing"));
        assert!(e.contains("- og:description: A sample GitHub repo"));
        assert!(e.contains("- keywords: testing, javascript, typescript"));
        assert!(e.contains("**Page Content Summary:**\n```\nThis is sample code content"));
    }

    #[test]
    fn generic_context_degrades_gracefully() {
        let result = enrich_prompt("What is this?", generic_context(), Platform::Unknown);
        let e = &result.enriched;
        assert!(e.contains("**Reference Context:**"));
        assert!(e.contains("- Page: \"Generic Web Page\""));
        assert!(!e.contains("Source Type"));
        assert!(!e.contains("Page Content Summary"));
    }

    #[test]
    fn metadata_values_are_capped_at_150() {
        let mut ctx = generic_context();
        ctx.metadata.insert("description".into(), "m".repeat(400));
        let result = enrich_prompt("q", ctx, Platform::Unknown);
        assert!(result.enriched.contains(&format!("- description: {}\n", "m".repeat(150))));
        assert!(!result.enriched.contains(&"m".repeat(151)));
    }

    #[test]
    fn excerpt_is_first_2000_chars() {
        let text = format!("{}{}", "a".repeat(2000), "b".repeat(500));
        let ctx = PageContext::new(
            "Long",
            "https://docs.example.com",
            SourceType::Docs,
            text,
            BTreeMap::new(),
        );
        let result = enrich_prompt("q", ctx, Platform::Unknown);
        assert!(result.enriched.contains(&format!("```\n{}\n```", "a".repeat(2000))));
        assert!(!result.enriched.contains(&"b".repeat(2)));
    }

    #[test]
    fn excerpt_requires_more_than_min_tokens() {
        let mut ctx = generic_context();
        ctx.token_count = 50;
        let result = enrich_prompt("q", ctx.clone(), Platform::Unknown);
        assert!(!result.enriched.contains("Page Content Summary"));

        ctx.token_count = 51;
        let result = enrich_prompt("q", ctx, Platform::Unknown);
        assert!(result.enriched.contains("Page Content Summary"));
    }

    #[test]
    fn unknown_platform_has_no_hint() {
        let result = enrich_prompt("Summarize", generic_context(), Platform::Unknown);
        for marker in ["GPT", "Claude", "Gemini", "*Note:"] {
            assert!(!result.enriched.contains(marker), "found {marker}");
        }
    }

    #[test]
    fn known_platforms_get_their_hint() {
        for (platform, marker) in [
            (Platform::Chatgpt, "GPT"),
            (Platform::Claude, "Claude"),
            (Platform::Gemini, "Gemini"),
        ] {
            let result = enrich_prompt("Summarize", generic_context(), platform);
            assert!(result.enriched.contains(marker), "{platform}");
        }
    }

    #[test]
    fn user_text_is_trimmed_but_not_escaped() {
        let text = "  <b>bold</b> \"quoted\"\ttab  \n";
        let result = enrich_prompt(text, generic_context(), Platform::Unknown);
        assert!(result.enriched.contains("\"<b>bold</b> \"quoted\"\ttab\""));
        // Untrimmed length is the denominator.
        assert_eq!(
            result.expansion_ratio,
            result.enriched.chars().count() as f64 / text.chars().count() as f64
        );
    }

    #[test]
    fn empty_text_ratio_uses_floor_of_one() {
        let result = enrich_prompt("", generic_context(), Platform::Unknown);
        assert_eq!(result.expansion_ratio, result.enriched.chars().count() as f64);
    }

    #[test]
    fn thinking_process_names_persona_style() {
        let result = enrich_prompt("q", github_context(), Platform::Unknown);
        assert!(result.enriched.contains(
            "3. Apply systematic problem decomposition with edge case analysis"
        ));
    }

    #[test]
    fn enrichment_is_idempotent() {
        let a = enrich_prompt("Same input", github_context(), Platform::Gemini);
        let b = enrich_prompt("Same input", github_context(), Platform::Gemini);
        assert_eq!(a.enriched, b.enriched);
        assert_eq!(a.expansion_ratio, b.expansion_ratio);
    }

    #[test]
    fn custom_options_change_excerpt() {
        let opts = EnrichOptions {
            content_excerpt_chars: 10,
            min_content_tokens: 0,
            ..EnrichOptions::default()
        };
        let result = enrich_prompt_with("q", generic_context(), Platform::Unknown, &opts);
        assert!(result.enriched.contains("```\nSome gener\n```"));
    }

    #[test]
    fn slow_assembly_warning_leaves_result_unchanged() {
        // A zero budget makes every assembly count as slow.
        let tight = EnrichOptions {
            latency_budget_ms: 0,
            ..EnrichOptions::default()
        };
        let warned = enrich_prompt_with("Explain this", github_context(), Platform::Claude, &tight);
        let normal = enrich_prompt("Explain this", github_context(), Platform::Claude);

        assert_eq!(warned.enriched, normal.enriched);
        assert_eq!(warned.expansion_ratio, normal.expansion_ratio);
        assert!(warned.processing_time_ms >= 0.0);
    }

    #[test]
    fn quick_enrich_layout() {
        let out = quick_enrich("  explain closures  ");
        assert!(out.starts_with("You are a Senior Expert Consultant"));
        assert!(out.contains("## Request\n\"explain closures\"\n\n## Expected Response\n"));
        assert!(out.ends_with("Think through the problem step-by-step before answering."));
        assert!(!out.contains("Reference Context"));
    }
}
