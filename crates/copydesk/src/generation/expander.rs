//! LLM-backed query expansion

use std::sync::Arc;

use crate::error::Result;
use crate::providers::LlmProvider;

use super::prompt::PromptBuilder;

/// Produces alternative phrasings of a question
pub struct QueryExpander {
    llm: Arc<dyn LlmProvider>,
    variants: usize,
}

impl QueryExpander {
    pub fn new(llm: Arc<dyn LlmProvider>, variants: usize) -> Self {
        Self { llm, variants }
    }

    /// The original query followed by up to `variants` rephrasings.
    ///
    /// The original is always first, even when the model returns nothing
    /// usable.
    pub async fn expand(&self, query: &str) -> Result<Vec<String>> {
        if self.variants == 0 {
            return Ok(vec![query.to_string()]);
        }

        let prompt = PromptBuilder::build_expansion_prompt(query, self.variants);
        let response = self.llm.complete(&prompt).await?;
        let queries = parse_variants(query, &response, self.variants);

        tracing::debug!("Expanded '{}' into {} queries", query, queries.len());
        Ok(queries)
    }

    /// Like [`expand`](Self::expand), falling back to `[query]` on failure
    pub async fn expand_or_original(&self, query: &str) -> Vec<String> {
        match self.expand(query).await {
            Ok(queries) => queries,
            Err(e) => {
                tracing::warn!("Query expansion failed, using original query only: {}", e);
                vec![query.to_string()]
            }
        }
    }
}

/// Split a completion into cleaned phrasings, original first
pub fn parse_variants(original: &str, response: &str, limit: usize) -> Vec<String> {
    let mut queries = vec![original.to_string()];
    let original_key = original.trim().to_lowercase();

    for line in response.lines() {
        let line = line.trim();
        // "Here are 3 alternatives:" style preambles
        if line.is_empty() || line.ends_with(':') {
            continue;
        }

        let cleaned = strip_quotes(strip_list_marker(line));
        if cleaned.is_empty() {
            continue;
        }

        let key = cleaned.to_lowercase();
        if key == original_key || queries.iter().any(|q| q.to_lowercase() == key) {
            continue;
        }

        queries.push(cleaned.to_string());
        if queries.len() > limit {
            break;
        }
    }

    queries
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim_start_matches(['-', '*', '•']).trim_start();

    let digits = line.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim_start();
        }
    }
    line
}

fn strip_quotes(text: &str) -> &str {
    text.trim()
        .trim_matches(|c| matches!(c, '"' | '\'' | '“' | '”'))
        .trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::ScriptedLlm;

    #[test]
    fn test_parse_strips_markers_and_preamble() {
        let response = "Here are 3 alternatives:\n1. \"Cost of home insurance?\"\n- home cover pricing\n2) premiums for houses\n";
        let queries = parse_variants("How much is home insurance?", response, 3);
        assert_eq!(
            queries,
            vec![
                "How much is home insurance?",
                "Cost of home insurance?",
                "home cover pricing",
                "premiums for houses",
            ]
        );
    }

    #[test]
    fn test_parse_caps_and_dedupes() {
        let response = "a\nA\nhome insurance\nb\nc\nd";
        let queries = parse_variants("home insurance", response, 3);
        assert_eq!(queries, vec!["home insurance", "a", "b", "c"]);
    }

    #[test]
    fn test_parse_keeps_leading_number_without_marker() {
        let queries = parse_variants("q", "24 hour claims line", 3);
        assert_eq!(queries[1], "24 hour claims line");
    }

    #[tokio::test]
    async fn test_expand_always_starts_with_original() {
        let llm = Arc::new(ScriptedLlm::new("\n\n"));
        let expander = QueryExpander::new(llm, 3);
        let queries = expander.expand("flood coverage").await.unwrap();
        assert_eq!(queries, vec!["flood coverage"]);
    }

    #[tokio::test]
    async fn test_expand_failure_falls_back() {
        let llm = Arc::new(ScriptedLlm::new("unused").fail_on("alternative phrasings"));
        let expander = QueryExpander::new(llm, 3);
        assert!(expander.expand("flood coverage").await.is_err());
        assert_eq!(expander.expand_or_original("flood coverage").await, vec!["flood coverage"]);
    }
}
