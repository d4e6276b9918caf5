//! Question answering: expand, retrieve per phrasing, merge, compose

use std::sync::Arc;
use std::time::Instant;

use crate::error::{Error, Result};
use crate::retrieval::RetrievalService;
use crate::types::{RagAnswer, RagRequest};

use super::composer::AnswerComposer;
use super::expander::QueryExpander;

/// End-to-end RAG pipeline
pub struct RagPipeline {
    expander: QueryExpander,
    retrieval: Arc<RetrievalService>,
    composer: AnswerComposer,
    per_query_top_k: usize,
}

impl RagPipeline {
    pub fn new(
        expander: QueryExpander,
        retrieval: Arc<RetrievalService>,
        composer: AnswerComposer,
        per_query_top_k: usize,
    ) -> Self {
        Self {
            expander,
            retrieval,
            composer,
            per_query_top_k,
        }
    }

    /// Answer a question from the stored artifacts
    pub async fn answer(&self, request: &RagRequest) -> Result<RagAnswer> {
        let start = Instant::now();
        let question = request.query.trim();
        if question.is_empty() {
            return Err(Error::Validation("query must not be empty".to_string()));
        }
        let top_k = request.top_k.unwrap_or(self.per_query_top_k);

        let queries = self.expander.expand_or_original(question).await;
        let documents = self.retrieval.query_many(&queries, top_k).await?;
        tracing::debug!(
            "Retrieved {} documents across {} phrasings",
            documents.len(),
            queries.len()
        );

        let composition = self
            .composer
            .compose(question, &documents, request.agentic)
            .await?;

        let processing_time_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "Answered '{}' in {}ms ({} sources, reflected: {})",
            question,
            processing_time_ms,
            composition.sources.len(),
            composition.reflected
        );

        Ok(RagAnswer {
            answer: composition.answer,
            sources: composition.sources,
            expanded_queries: queries,
            reflected: composition.reflected,
            follow_up_query: composition.follow_up_query,
            processing_time_ms,
        })
    }
}
