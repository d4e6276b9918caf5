//! Answer composition with at most one reflection round
//!
//! ```text
//! Drafting --(no marker | classic mode)--------------------> Done(draft)
//! Drafting --(marker)--> Reflecting --(no query | no docs)--> Done(draft)
//!                        Reflecting --(second completion)---> Done(reflected)
//! ```
//!
//! `Reflecting` never transitions back to `Drafting`, which bounds every
//! request to two completion calls.

use std::sync::Arc;

use crate::error::Result;
use crate::providers::LlmProvider;
use crate::retrieval::RetrievalService;
use crate::types::RetrievedDocument;

use super::prompt::PromptBuilder;
use super::reflection::ReflectionPolicy;

/// Answer returned when retrieval produced no context at all
pub const NO_CONTEXT_ANSWER: &str =
    "I could not find any relevant information in the stored documents to answer this question.";

/// A finished answer and the context it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct Composition {
    pub answer: String,
    /// Source ids used as context, first-seen order
    pub sources: Vec<String>,
    pub reflected: bool,
    pub follow_up_query: Option<String>,
}

enum ComposerState {
    Drafting,
    Reflecting { draft: String },
    Done(Composition),
}

/// Builds prompts, calls the completion backend and runs the reflection loop
pub struct AnswerComposer {
    llm: Arc<dyn LlmProvider>,
    retrieval: Arc<RetrievalService>,
    policy: ReflectionPolicy,
    suggestion_tag: String,
    delimiter: String,
    follow_up_top_k: usize,
}

impl AnswerComposer {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        retrieval: Arc<RetrievalService>,
        policy: ReflectionPolicy,
        suggestion_tag: impl Into<String>,
        delimiter: impl Into<String>,
        follow_up_top_k: usize,
    ) -> Self {
        Self {
            llm,
            retrieval,
            policy,
            suggestion_tag: suggestion_tag.into(),
            delimiter: delimiter.into(),
            follow_up_top_k,
        }
    }

    /// Answer `question` from `documents`.
    ///
    /// With `agentic` unset the first completion is returned as is. A
    /// failing first completion is an error; anything going wrong during
    /// reflection falls back to the first draft.
    pub async fn compose(
        &self,
        question: &str,
        documents: &[RetrievedDocument],
        agentic: bool,
    ) -> Result<Composition> {
        let mut sources: Vec<String> = documents.iter().map(|d| d.source_id.clone()).collect();
        let mut state = ComposerState::Drafting;

        loop {
            state = match state {
                ComposerState::Drafting => {
                    if documents.is_empty() {
                        tracing::info!("No context retrieved for '{}', skipping completion", question);
                        ComposerState::Done(Composition {
                            answer: NO_CONTEXT_ANSWER.to_string(),
                            sources: Vec::new(),
                            reflected: false,
                            follow_up_query: None,
                        })
                    } else {
                        let context = PromptBuilder::build_context(documents, &self.delimiter);
                        let prompt = if agentic {
                            PromptBuilder::build_agentic_prompt(question, &context, &self.suggestion_tag)
                        } else {
                            PromptBuilder::build_answer_prompt(question, &context)
                        };
                        let draft = self.llm.complete(&prompt).await?;

                        if agentic && self.policy.wants_more_context(&draft) {
                            ComposerState::Reflecting { draft }
                        } else {
                            ComposerState::Done(Self::finish(draft, &sources, false, None))
                        }
                    }
                }
                ComposerState::Reflecting { draft } => {
                    let outcome = self.reflect(question, &draft).await;
                    match outcome {
                        Reflection::Answered { answer, follow_up, new_sources } => {
                            for source in new_sources {
                                if !sources.contains(&source) {
                                    sources.push(source);
                                }
                            }
                            ComposerState::Done(Self::finish(answer, &sources, true, Some(follow_up)))
                        }
                        Reflection::KeptDraft { follow_up } => {
                            ComposerState::Done(Self::finish(draft, &sources, false, follow_up))
                        }
                    }
                }
                ComposerState::Done(composition) => return Ok(composition),
            };
        }
    }

    async fn reflect(&self, question: &str, draft: &str) -> Reflection {
        let Some(follow_up) = self.policy.extract_follow_up(draft) else {
            tracing::debug!("Draft asked for more context without a query, keeping it");
            return Reflection::KeptDraft { follow_up: None };
        };

        tracing::info!("Reflecting with follow-up query '{}'", follow_up);

        let documents = match self.retrieval.query(&follow_up, self.follow_up_top_k).await {
            Ok(documents) if !documents.is_empty() => documents,
            Ok(_) => {
                tracing::info!("Follow-up query '{}' found nothing, keeping draft", follow_up);
                return Reflection::KeptDraft { follow_up: Some(follow_up) };
            }
            Err(e) => {
                tracing::warn!("Follow-up retrieval failed, keeping draft: {}", e);
                return Reflection::KeptDraft { follow_up: Some(follow_up) };
            }
        };

        let context = PromptBuilder::build_context(&documents, &self.delimiter);
        let prompt = PromptBuilder::build_reflection_prompt(question, &context);
        match self.llm.complete(&prompt).await {
            Ok(answer) => Reflection::Answered {
                answer,
                follow_up,
                new_sources: documents.into_iter().map(|d| d.source_id).collect(),
            },
            Err(e) => {
                tracing::warn!("Reflection completion failed, keeping draft: {}", e);
                Reflection::KeptDraft { follow_up: Some(follow_up) }
            }
        }
    }

    fn finish(
        answer: String,
        sources: &[String],
        reflected: bool,
        follow_up_query: Option<String>,
    ) -> Composition {
        Composition {
            answer,
            sources: sources.to_vec(),
            reflected,
            follow_up_query,
        }
    }
}

enum Reflection {
    Answered {
        answer: String,
        follow_up: String,
        new_sources: Vec<String>,
    },
    KeptDraft {
        follow_up: Option<String>,
    },
}
