//! Vector store records and retrieval results

use serde::{Deserialize, Serialize};

/// A vector plus the metadata needed to find its source again.
///
/// `source_id` is the artifact's filesystem path: it is both the record's key
/// and the way the original text is re-read at query time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorRecord {
    /// Embedding of the source text
    pub vector: Vec<f32>,
    /// Path of the artifact the vector was built from
    pub source_id: String,
    /// Topic label supplied at ingest time
    pub topic: String,
}

impl VectorRecord {
    /// Create a new record
    pub fn new(vector: Vec<f32>, topic: impl Into<String>, source_id: impl Into<String>) -> Self {
        Self {
            vector,
            source_id: source_id.into(),
            topic: topic.into(),
        }
    }

    /// Split off the metadata half
    pub fn meta(&self) -> RecordMeta {
        RecordMeta {
            source_id: self.source_id.clone(),
            topic: self.topic.clone(),
        }
    }
}

/// Metadata entry persisted alongside each indexed vector
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMeta {
    pub source_id: String,
    pub topic: String,
}

/// A nearest-neighbour hit from the vector store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    /// Insertion position of the record
    pub position: usize,
    pub source_id: String,
    pub topic: String,
    /// Squared L2 distance (lower is more similar)
    pub distance: f32,
}

/// A hit with its source text loaded from disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub source_id: String,
    pub topic: String,
    /// Distance reported by the store
    pub score: f32,
    /// Full text of the artifact
    pub text: String,
}
