//! Context readiness: a 0–100 score and the three-level bucket.

use sparkle_shared::{ContextLevel, MAX_TOKENS, PageContext, SourceType, UNTITLED_PAGE};

/// Bucket a context by its token count alone.
pub fn level_from_token_count(token_count: usize) -> ContextLevel {
    match token_count {
        n if n > 500 => ContextLevel::High,
        n if n > 100 => ContextLevel::Medium,
        _ => ContextLevel::Low,
    }
}

/// Score how ready a context is to ground a prompt, in `0..=100`.
///
/// Title: 20. Token volume: up to 40, linear to [`MAX_TOKENS`].
/// Known source: 20. Metadata: 4 per entry, up to 20.
pub fn calculate_context_score(context: &PageContext) -> u8 {
    let mut score = 0.0_f64;

    if !context.title.is_empty() && context.title != UNTITLED_PAGE {
        score += 20.0;
    }

    score += (context.token_count as f64 / MAX_TOKENS as f64 * 40.0).min(40.0);

    if context.source_type != SourceType::Generic {
        score += 20.0;
    }

    score += (context.metadata.len() as f64 * 4.0).min(20.0);

    score.min(100.0).round() as u8
}

/// Bucket a context by its readiness score.
pub fn level_from_score(score: u8) -> ContextLevel {
    match score {
        s if s > 70 => ContextLevel::High,
        s if s > 40 => ContextLevel::Medium,
        _ => ContextLevel::Low,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn context(title: &str, source_type: SourceType, tokens: usize, meta: usize) -> PageContext {
        let metadata = (0..meta)
            .map(|i| (format!("key{i}"), "value".to_string()))
            .collect::<BTreeMap<_, _>>();
        let mut ctx = PageContext::new(title, "https://example.com", source_type, "", metadata);
        ctx.token_count = tokens;
        ctx
    }

    #[test]
    fn token_count_levels() {
        assert_eq!(level_from_token_count(0), ContextLevel::Low);
        assert_eq!(level_from_token_count(100), ContextLevel::Low);
        assert_eq!(level_from_token_count(101), ContextLevel::Medium);
        assert_eq!(level_from_token_count(500), ContextLevel::Medium);
        assert_eq!(level_from_token_count(501), ContextLevel::High);
        assert_eq!(level_from_token_count(10_000), ContextLevel::High);
    }

    #[test]
    fn score_levels() {
        assert_eq!(level_from_score(0), ContextLevel::Low);
        assert_eq!(level_from_score(40), ContextLevel::Low);
        assert_eq!(level_from_score(41), ContextLevel::Medium);
        assert_eq!(level_from_score(70), ContextLevel::Medium);
        assert_eq!(level_from_score(71), ContextLevel::High);
        assert_eq!(level_from_score(100), ContextLevel::High);
    }

    #[test]
    fn empty_context_scores_zero() {
        let ctx = context(UNTITLED_PAGE, SourceType::Generic, 0, 0);
        assert_eq!(calculate_context_score(&ctx), 0);
        assert_eq!(calculate_context_score(&context("", SourceType::Generic, 0, 0)), 0);
    }

    #[test]
    fn real_title_scores_at_least_twenty() {
        let ctx = context("Getting Started", SourceType::Generic, 0, 0);
        assert!(calculate_context_score(&ctx) >= 20);
    }

    #[test]
    fn rich_context_is_capped_at_100() {
        let mut ctx = context("Repo", SourceType::Github, 2000, 6);
        ctx.text_content = "x".repeat(10_000);
        let score = calculate_context_score(&ctx);
        assert!(score <= 100);
        assert_eq!(score, 100);

        let huge = context("Repo", SourceType::Github, 1_000_000, 100);
        assert_eq!(calculate_context_score(&huge), 100);
    }

    #[test]
    fn components_add_up() {
        // 20 (title) + 500/2000*40 = 10 + 20 (source) + 2*4 = 8
        let ctx = context("Paper", SourceType::Arxiv, 500, 2);
        assert_eq!(calculate_context_score(&ctx), 58);
    }

    #[test]
    fn score_rounds_to_nearest() {
        // 80/2000*40 = 1.6 -> 2
        let ctx = context(UNTITLED_PAGE, SourceType::Generic, 80, 0);
        assert_eq!(calculate_context_score(&ctx), 2);
    }

    #[test]
    fn score_is_deterministic_and_bounded() {
        for tokens in [0, 1, 99, 500, 1999, 2000, 50_000] {
            for meta in [0, 1, 5, 12] {
                for source in SourceType::ALL {
                    let ctx = context("T", source, tokens, meta);
                    let a = calculate_context_score(&ctx);
                    assert_eq!(a, calculate_context_score(&ctx));
                    assert!(a <= 100);
                }
            }
        }
    }
}
