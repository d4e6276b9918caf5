//! Prompt templates for expansion, answering and content generation

use crate::types::RetrievedDocument;

/// Prompt builder for RAG queries and content agents
pub struct PromptBuilder;

impl PromptBuilder {
    /// Join document texts with `delimiter`
    pub fn build_context(documents: &[RetrievedDocument], delimiter: &str) -> String {
        documents
            .iter()
            .map(|d| d.text.trim())
            .collect::<Vec<_>>()
            .join(delimiter)
    }

    /// Ask for alternative phrasings, one per line
    pub fn build_expansion_prompt(query: &str, variants: usize) -> String {
        format!(
            "Suggest {variants} alternative phrasings or synonyms for this insurance-related question: '{query}'\n\
             Return one phrasing per line with no numbering or commentary.",
            variants = variants,
            query = query
        )
    }

    /// Single-shot answer over retrieved context
    pub fn build_answer_prompt(question: &str, context: &str) -> String {
        format!(
            r#"Use the following context to answer the user's question.

Context:
{context}

Question: {question}
Answer:"#,
            context = context,
            question = question
        )
    }

    /// Answer prompt that invites the model to request one more retrieval
    pub fn build_agentic_prompt(question: &str, context: &str, suggestion_tag: &str) -> String {
        format!(
            r#"Use the following context to answer the user's question.

Context:
{context}

Question: {question}
Answer the question. If the context is not sufficient, suggest a new search query on its own line in the form "{tag} <query>", or ask the user for clarification."#,
            context = context,
            question = question,
            tag = capitalize(suggestion_tag)
        )
    }

    /// Second-round prompt built from follow-up context
    pub fn build_reflection_prompt(question: &str, new_context: &str) -> String {
        format!(
            r#"Here is more context:
{new_context}

Original question: {question}
Now answer the question:"#,
            new_context = new_context,
            question = question
        )
    }

    /// Ask the model whether a generated article is complete
    pub fn build_content_review_prompt(content: &str) -> String {
        format!(
            r#"Here is the generated content:
{content}

Is this content sufficient for the user's needs? If not, what should be added or clarified?"#,
            content = content
        )
    }

    /// Ask for the material a review found missing
    pub fn build_content_revision_prompt(content: &str, review: &str) -> String {
        format!(
            r#"Here is the generated content:
{content}

Review:
{review}

Add the missing details. Reply with the new material only, in the same style."#,
            content = content,
            review = review
        )
    }

    /// SEO and geo-targeted article prompt
    pub fn build_article_prompt(
        topic: &str,
        style: &str,
        length: &str,
        include_faqs: bool,
        word_limit: u32,
        region: &str,
        context: &str,
    ) -> String {
        let faqs = if include_faqs {
            "- End with an FAQ section: clear, concise answers optimized for featured snippets."
        } else {
            "- Do not include an FAQ section."
        };

        format!(
            r#"You are an expert SEO and geo-targeted content writer specializing in high-conversion copywriting.

Your goal is to write a {length} article in a {style} tone on the topic: '{topic}'.

**Key Instructions:**
- Optimize for high-converting, long-tail keywords related to the topic and {region}.
- Include location-specific language and examples to increase local relevance.
- Structure the content with a compelling H1, SEO-friendly subheadings (H2/H3), and a persuasive meta title and meta description.
- Write with lead generation in mind: include trust-building statements, benefit-driven CTAs, and soft sales language without being overly promotional.
- Use real-world benefits, social proof suggestions (testimonials, location mentions), and clear outcomes to engage readers.
- Use formatting that enhances readability: bullet points, numbered lists, short paragraphs, bolded key phrases.
{faqs}
- Limit the word count to {word_limit} words maximum.
- Write in a way that appeals to both Google and the reader: natural, helpful and trustworthy.

**Context:**
{context}
"#,
            length = length.to_lowercase(),
            style = style.to_lowercase(),
            topic = topic,
            region = region,
            faqs = faqs,
            word_limit = word_limit,
            context = context
        )
    }

    /// Short social media post prompt
    pub fn build_marketing_post_prompt(company: &str, topic: &str, style: &str, length: &str) -> String {
        format!(
            r#"You are a creative marketing assistant for {company}.
Generate a {length} social media post about: "{topic}".
Make it engaging, professional, and include a call to action.
Always mention {company} as the company.
Style: {style}
"#,
            company = company,
            length = length.to_lowercase(),
            topic = topic,
            style = style
        )
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(text: &str) -> RetrievedDocument {
        RetrievedDocument {
            source_id: "/tmp/a.txt".to_string(),
            topic: "a".to_string(),
            score: 0.0,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_build_context_uses_delimiter() {
        let context = PromptBuilder::build_context(&[doc("one\n"), doc("two")], "\n---\n");
        assert_eq!(context, "one\n---\ntwo");
    }

    #[test]
    fn test_agentic_prompt_names_tag() {
        let prompt = PromptBuilder::build_agentic_prompt("What is covered?", "ctx", "suggested query:");
        assert!(prompt.contains("\"Suggested query: <query>\""));
        assert!(prompt.contains("Question: What is covered?"));
    }

    #[test]
    fn test_article_prompt_faq_toggle() {
        let with = PromptBuilder::build_article_prompt("Flood cover", "Informative", "Short", true, 800, "Ontario, Canada", "");
        let without = PromptBuilder::build_article_prompt("Flood cover", "Informative", "Short", false, 800, "Ontario, Canada", "");
        assert!(with.contains("FAQ section: clear"));
        assert!(without.contains("Do not include an FAQ"));
        assert!(with.contains("a short article in a informative tone"));
        assert!(with.contains("800 words maximum"));
    }
}
