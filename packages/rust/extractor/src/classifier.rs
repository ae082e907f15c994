//! URL classification: content domain and chat platform.
//!
//! Both tables are ordered; the first matching rule wins.

use std::sync::LazyLock;

use regex::Regex;

use sparkle_shared::{Platform, SourceType};

static SOURCE_RULES: LazyLock<Vec<(Regex, SourceType)>> = LazyLock::new(|| {
    [
        (r"github\.com", SourceType::Github),
        (r"arxiv\.org", SourceType::Arxiv),
        (r"jira|atlassian", SourceType::Jira),
        (r"stackoverflow\.com|stackexchange\.com", SourceType::Stackoverflow),
        (r"(?i)docs\.|documentation|readme", SourceType::Docs),
    ]
    .into_iter()
    .map(|(pattern, kind)| (Regex::new(pattern).expect("static source pattern"), kind))
    .collect()
});

static PLATFORM_RULES: LazyLock<Vec<(Regex, Platform)>> = LazyLock::new(|| {
    [
        (r"chat\.openai\.com|chatgpt\.com", Platform::Chatgpt),
        (r"claude\.ai", Platform::Claude),
        (r"gemini\.google\.com", Platform::Gemini),
    ]
    .into_iter()
    .map(|(pattern, platform)| (Regex::new(pattern).expect("static platform pattern"), platform))
    .collect()
});

/// Map a URL to its content domain. Falls back to [`SourceType::Generic`].
pub fn classify(url: &str) -> SourceType {
    SOURCE_RULES
        .iter()
        .find(|(re, _)| re.is_match(url))
        .map(|(_, kind)| *kind)
        .unwrap_or(SourceType::Generic)
}

/// Identify the chat platform a URL belongs to.
pub fn detect_platform(url: &str) -> Platform {
    PLATFORM_RULES
        .iter()
        .find(|(re, _)| re.is_match(url))
        .map(|(_, platform)| *platform)
        .unwrap_or(Platform::Unknown)
}

/// Whether a URL is on one of the supported chat platforms.
pub fn is_supported_platform(url: &str) -> bool {
    detect_platform(url) != Platform::Unknown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_known_sources() {
        assert_eq!(classify("https://github.com/rust-lang/rust/issues/1"), SourceType::Github);
        assert_eq!(classify("https://arxiv.org/abs/1234.5678"), SourceType::Arxiv);
        assert_eq!(classify("https://company.atlassian.net/browse/PROJ-1"), SourceType::Jira);
        assert_eq!(classify("https://jira.example.org/browse/X-2"), SourceType::Jira);
        assert_eq!(classify("https://stackoverflow.com/questions/123"), SourceType::Stackoverflow);
        assert_eq!(classify("https://unix.stackexchange.com/q/9"), SourceType::Stackoverflow);
        assert_eq!(classify("https://docs.rs/serde"), SourceType::Docs);
    }

    #[test]
    fn docs_rule_is_case_insensitive() {
        assert_eq!(classify("https://example.com/README.md"), SourceType::Docs);
        assert_eq!(classify("https://example.com/Documentation/intro"), SourceType::Docs);
    }

    #[test]
    fn first_rule_wins() {
        // Matches both the github and readme rules.
        assert_eq!(classify("https://github.com/user/repo/blob/main/README.md"), SourceType::Github);
    }

    #[test]
    fn unmatched_or_malformed_is_generic() {
        assert_eq!(classify("https://example.com/page"), SourceType::Generic);
        assert_eq!(classify("not even a url"), SourceType::Generic);
        assert_eq!(classify(""), SourceType::Generic);
    }

    #[test]
    fn detects_platforms() {
        assert_eq!(detect_platform("https://chat.openai.com/c/abc"), Platform::Chatgpt);
        assert_eq!(detect_platform("https://chatgpt.com/"), Platform::Chatgpt);
        assert_eq!(detect_platform("https://claude.ai/chat/1"), Platform::Claude);
        assert_eq!(detect_platform("https://gemini.google.com/app"), Platform::Gemini);
        assert_eq!(detect_platform("https://example.com"), Platform::Unknown);
        assert!(is_supported_platform("https://claude.ai/new"));
        assert!(!is_supported_platform("https://github.com"));
    }
}
