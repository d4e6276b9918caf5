//! copydesk: marketing copy generation backed by retrieval over past artifacts
//!
//! Generated articles and posts are saved as plain-text artifacts. Artifacts
//! can be embedded into a flat vector store, and questions are answered by
//! expanding the query, retrieving per phrasing and composing an answer with
//! at most one reflection round.

pub mod config;
pub mod error;
pub mod generation;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod storage;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use generation::{ContentGenerator, RagPipeline};
pub use retrieval::{DocumentResolver, RetrievalService, VectorStore};
pub use types::{RagAnswer, RagRequest, RetrievedDocument, VectorRecord};
