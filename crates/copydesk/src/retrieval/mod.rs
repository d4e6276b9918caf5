//! Vector storage, topic resolution and similarity retrieval

pub mod resolver;
pub mod service;
pub mod store;

pub use resolver::{topic_from_file_name, Artifact, DocumentResolver};
pub use service::RetrievalService;
pub use store::{InsertOutcome, VectorStore};
