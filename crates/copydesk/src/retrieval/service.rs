//! Ingest and query over the vector store

use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::{
    BackfillFailure, BackfillReport, IngestReport, RetrievedDocument, SearchHit, VectorRecord,
};

use super::resolver::{topic_from_file_name, DocumentResolver};
use super::store::VectorStore;

/// Embeds artifacts into the store and answers similarity queries
pub struct RetrievalService {
    store: Arc<VectorStore>,
    resolver: DocumentResolver,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl RetrievalService {
    pub fn new(
        store: Arc<VectorStore>,
        resolver: DocumentResolver,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> Self {
        Self {
            store,
            resolver,
            embedder,
        }
    }

    pub fn store(&self) -> &Arc<VectorStore> {
        &self.store
    }

    /// Embed the newest artifact matching `topic` and append it to the store
    pub async fn ingest(&self, topic: &str) -> Result<IngestReport> {
        let topic = topic.trim();
        if topic.is_empty() {
            return Err(Error::Validation("topic must not be empty".to_string()));
        }

        let path = self.resolver.resolve_latest(topic)?;
        self.ingest_path(&path, topic).await
    }

    /// Embed a specific artifact under `topic`
    pub async fn ingest_path(&self, path: &Path, topic: &str) -> Result<IngestReport> {
        let text = tokio::fs::read_to_string(path).await?;
        let vector = self.embedder.embed(&text).await?;
        let embedding_dim = vector.len();

        let source_id = path.to_string_lossy().into_owned();
        let record = VectorRecord::new(vector, topic, source_id.clone());

        let store = Arc::clone(&self.store);
        let outcome = tokio::task::spawn_blocking(move || store.insert(record))
            .await
            .map_err(|e| Error::internal(format!("insert task failed: {}", e)))??;

        tracing::info!(
            "Ingested {} as '{}' ({} records, {}-d)",
            source_id,
            topic,
            outcome.index_size,
            embedding_dim
        );

        Ok(IngestReport {
            source_id,
            topic: topic.to_string(),
            embedding_dim,
            index_size: outcome.index_size,
            replaced: outcome.replaced,
        })
    }

    /// Embed every artifact not yet present in the store.
    ///
    /// Per-file failures are collected rather than aborting the run.
    pub async fn backfill(&self) -> Result<BackfillReport> {
        let known: HashSet<String> = self
            .store
            .records()?
            .into_iter()
            .map(|meta| meta.source_id)
            .collect();

        let mut report = BackfillReport::default();
        for artifact in self.resolver.artifacts()? {
            let source_id = artifact.path.to_string_lossy().into_owned();
            if known.contains(&source_id) {
                report.skipped.push(source_id);
                continue;
            }

            let topic = topic_from_file_name(&artifact.file_name);
            match self.ingest_path(&artifact.path, &topic).await {
                Ok(ingested) => report.ingested.push(ingested),
                Err(e) => {
                    tracing::warn!("Backfill failed for {}: {}", source_id, e);
                    report.failed.push(BackfillFailure {
                        source_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::info!(
            "Backfill complete: {} ingested, {} skipped, {} failed",
            report.ingested.len(),
            report.skipped.len(),
            report.failed.len()
        );
        Ok(report)
    }

    /// Nearest stored records for `text`
    pub async fn search(&self, text: &str, top_k: usize) -> Result<Vec<SearchHit>> {
        // Fail fast without paying for an embedding
        if !self.store.exists() {
            return Err(Error::NoIndex);
        }

        let vector = self.embedder.embed(text).await?;
        let store = Arc::clone(&self.store);
        tokio::task::spawn_blocking(move || store.search(&vector, top_k))
            .await
            .map_err(|e| Error::internal(format!("search task failed: {}", e)))?
    }

    /// Nearest stored records for `text`, with their source text loaded
    pub async fn query(&self, text: &str, top_k: usize) -> Result<Vec<RetrievedDocument>> {
        let hits = self.search(text, top_k).await?;
        Ok(self.load_documents(hits).await)
    }

    /// Run one search per phrasing and merge the results.
    ///
    /// Legs run in order. A leg whose embedding call fails, or whose vector
    /// does not match the store dimension, is logged and skipped; the merged
    /// list keeps the first occurrence of each source. Only when every leg
    /// fails is the first error returned. Store errors are returned
    /// immediately.
    pub async fn query_many(&self, queries: &[String], top_k: usize) -> Result<Vec<RetrievedDocument>> {
        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        let mut first_error = None;
        let mut succeeded = 0usize;

        for query in queries {
            match self.search(query, top_k).await {
                Ok(hits) => {
                    succeeded += 1;
                    for hit in hits {
                        if seen.insert(hit.source_id.clone()) {
                            merged.push(hit);
                        }
                    }
                }
                // Store-level failures would repeat for every leg
                Err(e) if !leg_failure(&e) => return Err(e),
                Err(e) => {
                    tracing::warn!("Retrieval failed for '{}': {}", query, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        if succeeded == 0 {
            if let Some(e) = first_error {
                return Err(e);
            }
        }

        Ok(self.load_documents(merged).await)
    }

    async fn load_documents(&self, hits: Vec<SearchHit>) -> Vec<RetrievedDocument> {
        let mut documents = Vec::with_capacity(hits.len());
        for hit in hits {
            match tokio::fs::read_to_string(&hit.source_id).await {
                Ok(text) => documents.push(RetrievedDocument {
                    source_id: hit.source_id,
                    topic: hit.topic,
                    score: hit.distance,
                    text,
                }),
                Err(e) => {
                    tracing::warn!("Skipping unreadable source {}: {}", hit.source_id, e);
                }
            }
        }
        documents
    }
}

/// Errors confined to one query phrasing
fn leg_failure(error: &Error) -> bool {
    error.is_backend() || matches!(error, Error::DimensionMismatch { .. })
}
