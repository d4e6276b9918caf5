//! Decides whether a draft answer asks for more context

use regex::{Regex, RegexBuilder};

use crate::config::ReflectionConfig;

/// Marker-based reflection check plus follow-up query extraction
#[derive(Debug, Clone)]
pub struct ReflectionPolicy {
    markers: Vec<String>,
    tag: Option<Regex>,
}

impl ReflectionPolicy {
    pub fn new(config: &ReflectionConfig) -> Self {
        Self::with_markers(&config.markers, &config.suggested_query_tag)
    }

    /// Policy for reviewing generated articles; it extracts no follow-up query
    pub fn for_content(config: &ReflectionConfig) -> Self {
        Self::with_markers(&config.content_markers, "")
    }

    fn with_markers(markers: &[String], tag: &str) -> Self {
        let markers = markers
            .iter()
            .map(|m| m.trim().to_lowercase())
            .filter(|m| !m.is_empty())
            .collect();

        let tag = tag.trim();
        let tag = if tag.is_empty() {
            None
        } else {
            RegexBuilder::new(&format!(r"{}[ \t]*(.+)", regex::escape(tag)))
                .case_insensitive(true)
                .build()
                .map_err(|e| tracing::warn!("Invalid suggested-query tag '{}': {}", tag, e))
                .ok()
        };

        Self { markers, tag }
    }

    /// Whether the draft contains any reflection marker (case-insensitive)
    pub fn wants_more_context(&self, answer: &str) -> bool {
        let lower = answer.to_lowercase();
        self.markers.iter().any(|m| lower.contains(m.as_str()))
    }

    /// The query following the suggestion tag, up to the end of its line
    pub fn extract_follow_up(&self, answer: &str) -> Option<String> {
        let captures = self.tag.as_ref()?.captures(answer)?;
        let query = captures
            .get(1)?
            .as_str()
            .trim()
            .trim_matches(|c| matches!(c, '"' | '\'' | '`' | '*' | '“' | '”'))
            .trim();

        (!query.is_empty()).then(|| query.to_string())
    }
}

impl Default for ReflectionPolicy {
    fn default() -> Self {
        Self::new(&ReflectionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markers_are_case_insensitive() {
        let policy = ReflectionPolicy::default();
        assert!(policy.wants_more_context("Could you CLARIFY which province?"));
        assert!(policy.wants_more_context("I suggest looking at the policy wording."));
        assert!(!policy.wants_more_context("Premiums start at $40 per month."));
    }

    #[test]
    fn test_extracts_first_line_after_tag() {
        let policy = ReflectionPolicy::default();
        let answer = "The context lacks rates.\nSuggested Query: \"condo insurance rates Toronto\"\nThanks.";
        assert_eq!(
            policy.extract_follow_up(answer).as_deref(),
            Some("condo insurance rates Toronto")
        );
    }

    #[test]
    fn test_marker_without_tag_yields_nothing() {
        let policy = ReflectionPolicy::default();
        let answer = "I suggest asking an advisor.";
        assert!(policy.wants_more_context(answer));
        assert_eq!(policy.extract_follow_up(answer), None);
        assert_eq!(policy.extract_follow_up("Suggested query:   \nnext"), None);
    }

    #[test]
    fn test_custom_markers() {
        let config = ReflectionConfig {
            markers: vec!["NEED MORE".to_string(), " ".to_string()],
            suggested_query_tag: "search for:".to_string(),
            ..Default::default()
        };
        let policy = ReflectionPolicy::new(&config);
        assert!(policy.wants_more_context("I need more data"));
        assert!(!policy.wants_more_context("suggest"));
        assert_eq!(
            policy.extract_follow_up("Search for: flood maps").as_deref(),
            Some("flood maps")
        );
    }

    #[test]
    fn test_content_policy_uses_content_markers() {
        let policy = ReflectionPolicy::for_content(&ReflectionConfig::default());
        assert!(policy.wants_more_context("You should ADD a section on deductibles."));
        assert!(policy.wants_more_context("Please clarify the coverage limits."));
        assert!(!policy.wants_more_context("The content is sufficient."));
        assert_eq!(policy.extract_follow_up("Suggested query: flood maps"), None);
    }
}
