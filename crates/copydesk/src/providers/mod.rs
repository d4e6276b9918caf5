//! Provider abstractions for embeddings, completions and document export
//!
//! Handlers only see the traits; the concrete backend (OpenAI or Ollama) is
//! picked from configuration at start-up.

pub mod embedding;
pub mod export;
pub mod google_docs;
pub mod llm;
pub mod mock;
pub mod ollama;
pub mod openai;
mod retry;

pub use embedding::EmbeddingProvider;
pub use export::DocumentExporter;
pub use google_docs::GoogleDocsExporter;
pub use llm::LlmProvider;
pub use mock::{HashEmbedder, RecordingExporter, ScriptedLlm};
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use std::sync::Arc;

use crate::config::{BackendProvider, LlmConfig};
use crate::error::Result;

/// Build the embedding and completion providers named by `config.backend`.
///
/// Both halves share one HTTP client.
pub fn from_config(config: &LlmConfig) -> Result<(Arc<dyn EmbeddingProvider>, Arc<dyn LlmProvider>)> {
    match config.backend {
        BackendProvider::OpenAi => {
            let client = Arc::new(OpenAiClient::new(config)?);
            Ok((client.clone(), client))
        }
        BackendProvider::Ollama => {
            let client = Arc::new(OllamaClient::new(config)?);
            Ok((client.clone(), client))
        }
    }
}
