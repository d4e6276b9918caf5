//! Application state for the copydesk server

use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::generation::{
    AnswerComposer, ContentGenerator, QueryExpander, RagPipeline, ReflectionPolicy,
};
use crate::providers::{self, DocumentExporter, EmbeddingProvider, GoogleDocsExporter, LlmProvider};
use crate::retrieval::{DocumentResolver, RetrievalService, VectorStore};
use crate::storage::ArtifactWriter;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RagConfig,
    /// Embedding provider (OpenAI or Ollama)
    embedding_provider: Arc<dyn EmbeddingProvider>,
    /// Completion provider (OpenAI or Ollama)
    llm_provider: Arc<dyn LlmProvider>,
    /// Ingest and similarity search
    retrieval: Arc<RetrievalService>,
    /// Expand, retrieve, compose
    pipeline: RagPipeline,
    /// Article and post agents
    content: ContentGenerator,
    /// Set once the backends answer a health check
    ready: RwLock<bool>,
}

impl AppState {
    /// Create state with the providers named in `config`
    pub async fn new(config: RagConfig) -> Result<Self> {
        tracing::info!(
            "Initializing copydesk state (backend: {:?}, outputs: {})",
            config.llm.backend,
            config.storage.outputs_dir.display()
        );

        let (embedder, llm) = providers::from_config(&config.llm)?;
        let exporter: Option<Arc<dyn DocumentExporter>> =
            match GoogleDocsExporter::from_config(&config.export)? {
                Some(exporter) => Some(Arc::new(exporter)),
                None => {
                    tracing::info!("No export token configured; marketing post export disabled");
                    None
                }
            };

        Self::with_providers(config, embedder, llm, exporter)
    }

    /// Create state around explicit providers
    pub fn with_providers(
        config: RagConfig,
        embedder: Arc<dyn EmbeddingProvider>,
        llm: Arc<dyn LlmProvider>,
        exporter: Option<Arc<dyn DocumentExporter>>,
    ) -> Result<Self> {
        std::fs::create_dir_all(&config.storage.outputs_dir)?;

        let store = Arc::new(VectorStore::new(&config.storage));
        let resolver = DocumentResolver::new(&config.storage.outputs_dir);
        let retrieval = Arc::new(RetrievalService::new(store, resolver, Arc::clone(&embedder)));

        let composer = AnswerComposer::new(
            Arc::clone(&llm),
            Arc::clone(&retrieval),
            ReflectionPolicy::new(&config.reflection),
            config.reflection.suggested_query_tag.clone(),
            config.retrieval.context_delimiter.clone(),
            config.retrieval.top_k,
        );
        let pipeline = RagPipeline::new(
            QueryExpander::new(Arc::clone(&llm), config.retrieval.expansion_variants),
            Arc::clone(&retrieval),
            composer,
            config.retrieval.per_query_top_k,
        );
        let content = ContentGenerator::new(
            Arc::clone(&llm),
            ArtifactWriter::new(&config.storage.outputs_dir),
            exporter,
            config.content.clone(),
            ReflectionPolicy::for_content(&config.reflection),
            config.export.title_prefix.clone(),
        );

        tracing::info!(
            "Providers ready: embeddings via {}, completions via {} ({})",
            embedder.name(),
            llm.name(),
            llm.model()
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                embedding_provider: embedder,
                llm_provider: llm,
                retrieval,
                pipeline,
                content,
                ready: RwLock::new(false),
            }),
        })
    }

    /// Get configuration
    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    /// Get embedding provider
    pub fn embedding_provider(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.inner.embedding_provider
    }

    /// Get completion provider
    pub fn llm_provider(&self) -> &Arc<dyn LlmProvider> {
        &self.inner.llm_provider
    }

    /// Get retrieval service
    pub fn retrieval(&self) -> &Arc<RetrievalService> {
        &self.inner.retrieval
    }

    /// Get RAG pipeline
    pub fn pipeline(&self) -> &RagPipeline {
        &self.inner.pipeline
    }

    /// Get content generator
    pub fn content(&self) -> &ContentGenerator {
        &self.inner.content
    }

    /// Check if the server is ready
    pub fn is_ready(&self) -> bool {
        *self.inner.ready.read()
    }

    /// Health-check both providers and record the result as readiness
    pub async fn check_backends(&self) -> bool {
        let embedder = self.embedding_provider();
        let llm = self.llm_provider();

        let embedder_ok = match embedder.health_check().await {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!("{} health check failed: {}", embedder.name(), e);
                false
            }
        };
        let llm_ok = match llm.health_check().await {
            Ok(ok) => ok,
            Err(e) => {
                tracing::warn!("{} health check failed: {}", llm.name(), e);
                false
            }
        };

        let ready = embedder_ok && llm_ok;
        *self.inner.ready.write() = ready;
        tracing::info!(
            "Backend check: embeddings {} {}, completions {} {}",
            embedder.name(),
            if embedder_ok { "up" } else { "down" },
            llm.name(),
            if llm_ok { "up" } else { "down" }
        );
        ready
    }
}
