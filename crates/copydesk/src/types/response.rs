//! HTTP response bodies

use serde::{Deserialize, Serialize};

use super::record::{RecordMeta, SearchHit};

/// Outcome of a successful ingest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngestReport {
    /// Artifact that was embedded
    pub source_id: String,
    pub topic: String,
    /// Length of the stored vector
    pub embedding_dim: usize,
    /// Records in the store after the insert
    pub index_size: usize,
    /// Older entries for the same source dropped by the duplicate policy
    pub replaced: usize,
}

/// One file that could not be ingested during backfill
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackfillFailure {
    pub source_id: String,
    pub error: String,
}

/// Outcome of embedding every not-yet-indexed artifact
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackfillReport {
    pub ingested: Vec<IngestReport>,
    /// Sources already present in the store
    pub skipped: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<BackfillFailure>,
}

/// Stored records, in insertion order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordListResponse {
    pub records: Vec<RecordMeta>,
    pub total_count: usize,
    /// Vector dimension, absent until the first insert
    pub dimension: Option<usize>,
}

/// Similarity search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: String,
    pub hits: Vec<SearchHit>,
    pub processing_time_ms: u64,
}

/// Final answer from the RAG pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagAnswer {
    pub answer: String,
    /// Sources used as context, first-seen order
    pub sources: Vec<String>,
    /// The phrasings retrieval ran with (original first)
    pub expanded_queries: Vec<String>,
    /// Whether a reflection round replaced the first draft
    pub reflected: bool,
    /// Follow-up query extracted from the first draft, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follow_up_query: Option<String>,
    pub processing_time_ms: u64,
}

/// Generated SEO article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleResponse {
    pub content: String,
    /// Artifact file name inside the outputs directory
    pub filename: String,
    pub download_url: String,
    /// A review round appended material to the draft
    #[serde(default)]
    pub revised: bool,
}

/// Generated social media post
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketingPostResponse {
    pub post: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_url: Option<String>,
    /// Export failure, reported next to the post
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
