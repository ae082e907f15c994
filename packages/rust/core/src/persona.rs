//! Expert personas, one per source type.

use sparkle_shared::{ExpertPersona, SourceType};

static GITHUB: ExpertPersona = ExpertPersona {
    role: "Senior Software Engineer",
    expertise: &["code review", "software architecture", "best practices", "debugging"],
    thinking_style: "systematic problem decomposition with edge case analysis",
    output_format: "structured code with inline documentation",
};

static ARXIV: ExpertPersona = ExpertPersona {
    role: "Research Scientist",
    expertise: &[
        "academic research",
        "paper analysis",
        "methodology critique",
        "statistical rigor",
    ],
    thinking_style: "critical evaluation with citations and limitations",
    output_format: "structured analysis with key findings and implications",
};

static JIRA: ExpertPersona = ExpertPersona {
    role: "Technical Project Manager",
    expertise: &[
        "requirements analysis",
        "task breakdown",
        "sprint planning",
        "technical communication",
    ],
    thinking_style: "user-story driven with acceptance criteria",
    output_format: "actionable items with clear deliverables",
};

static STACKOVERFLOW: ExpertPersona = ExpertPersona {
    role: "Senior Developer & Technical Writer",
    expertise: &["debugging", "solution comparison", "code examples", "common pitfalls"],
    thinking_style: "root cause analysis with multiple solution approaches",
    output_format: "clear explanation with working code examples",
};

static DOCS: ExpertPersona = ExpertPersona {
    role: "Technical Documentation Expert",
    expertise: &["API documentation", "tutorials", "integration guides", "best practices"],
    thinking_style: "step-by-step guidance with practical examples",
    output_format: "clear documentation with code snippets",
};

static GENERIC: ExpertPersona = ExpertPersona {
    role: "Senior Expert Consultant",
    expertise: &[
        "analysis",
        "problem-solving",
        "comprehensive explanations",
        "best practices",
    ],
    thinking_style: "thorough analysis considering multiple perspectives",
    output_format: "well-structured response with actionable insights",
};

/// The persona that frames prompts for pages of `source_type`.
pub fn persona_for(source_type: SourceType) -> &'static ExpertPersona {
    match source_type {
        SourceType::Github => &GITHUB,
        SourceType::Arxiv => &ARXIV,
        SourceType::Jira => &JIRA,
        SourceType::Stackoverflow => &STACKOVERFLOW,
        SourceType::Docs => &DOCS,
        SourceType::Generic => &GENERIC,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_per_source_type() {
        let roles: Vec<_> = SourceType::ALL
            .iter()
            .map(|s| (*s, persona_for(*s).role))
            .collect();
        assert_eq!(
            roles,
            vec![
                (SourceType::Github, "Senior Software Engineer"),
                (SourceType::Arxiv, "Research Scientist"),
                (SourceType::Jira, "Technical Project Manager"),
                (SourceType::Stackoverflow, "Senior Developer & Technical Writer"),
                (SourceType::Docs, "Technical Documentation Expert"),
                (SourceType::Generic, "Senior Expert Consultant"),
            ]
        );
    }

    #[test]
    fn every_persona_is_complete() {
        for source in SourceType::ALL {
            let p = persona_for(source);
            assert_eq!(p.expertise.len(), 4, "{source}");
            assert!(!p.thinking_style.is_empty());
            assert!(!p.output_format.is_empty());
        }
    }

    #[test]
    fn lookup_returns_the_same_constant() {
        assert!(std::ptr::eq(
            persona_for(SourceType::Docs),
            persona_for(SourceType::Docs)
        ));
    }
}
