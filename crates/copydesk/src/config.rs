//! Configuration for copydesk

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RagConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Completion / embedding backend configuration
    pub llm: LlmConfig,
    /// Artifact directory and vector store files
    pub storage: StorageConfig,
    /// Retrieval and query expansion settings
    pub retrieval: RetrievalConfig,
    /// Reflection trigger policy
    pub reflection: ReflectionConfig,
    /// Content generation defaults
    pub content: ContentConfig,
    /// Document export (Google Docs)
    pub export: ExportConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Cannot read config file {}: {}", path.display(), e))
        })?;
        Self::from_toml(&raw)
    }

    /// Parse configuration from a TOML string
    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::Config(format!("Invalid config: {}", e)))
    }

    /// Load from `COPYDESK_CONFIG` (if set) and apply environment overrides
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("COPYDESK_CONFIG") {
            Ok(path) if !path.is_empty() => Self::load(path)?,
            _ => Self::default(),
        };
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply environment variable overrides on top of the loaded values
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            if !key.is_empty() {
                self.llm.api_key = Some(key);
            }
        }
        if let Ok(dir) = std::env::var("COPYDESK_OUTPUTS_DIR") {
            if !dir.is_empty() {
                self.storage.outputs_dir = PathBuf::from(dir);
            }
        }
        if let Ok(backend) = std::env::var("COPYDESK_LLM_BACKEND") {
            self.llm.backend = backend.parse()?;
        }
        if let Ok(token) = std::env::var("GOOGLE_DOCS_ACCESS_TOKEN") {
            if !token.is_empty() {
                self.export.access_token = Some(token);
            }
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            enable_cors: true,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Which service answers completion and embedding calls
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendProvider {
    /// OpenAI-compatible chat completions and embeddings API
    #[default]
    OpenAi,
    /// Local Ollama server
    Ollama,
}

impl std::str::FromStr for BackendProvider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            other => Err(Error::Config(format!("Unknown LLM backend: {}", other))),
        }
    }
}

/// LLM backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// Backend provider
    pub backend: BackendProvider,
    /// API base URL
    pub base_url: String,
    /// API key (OpenAI only)
    pub api_key: Option<String>,
    /// Chat / generation model name
    pub chat_model: String,
    /// Embedding model name
    pub embed_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
    /// System prompt sent with every chat completion
    pub system_prompt: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: BackendProvider::OpenAi,
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            chat_model: "gpt-3.5-turbo".to_string(),
            embed_model: "text-embedding-3-small".to_string(),
            temperature: 0.7,
            timeout_secs: 120,
            max_retries: 2,
            system_prompt: None,
        }
    }
}

impl LlmConfig {
    /// Defaults for a local Ollama server
    pub fn ollama() -> Self {
        Self {
            backend: BackendProvider::Ollama,
            base_url: "http://localhost:11434".to_string(),
            chat_model: "llama3.2:3b".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            ..Default::default()
        }
    }
}

/// What to do when a source is ingested again
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Drop older entries for the same source before appending (upsert by id)
    #[default]
    Replace,
    /// Keep every insert, duplicates included
    Allow,
}

/// Artifact directory and vector store file locations
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding generated `.txt` artifacts
    pub outputs_dir: PathBuf,
    /// Index file name (relative to `outputs_dir` unless absolute)
    pub index_file: PathBuf,
    /// Metadata file name (relative to `outputs_dir` unless absolute)
    pub metadata_file: PathBuf,
    /// Duplicate ingest handling
    pub duplicate_policy: DuplicatePolicy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let outputs_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("copydesk")
            .join("outputs");

        Self {
            outputs_dir,
            index_file: PathBuf::from("vectors.index"),
            metadata_file: PathBuf::from("vectors.meta"),
            duplicate_policy: DuplicatePolicy::Replace,
        }
    }
}

impl StorageConfig {
    /// Storage rooted at `dir` with default file names
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            outputs_dir: dir.into(),
            ..Default::default()
        }
    }

    /// Resolved path of the index file
    pub fn index_path(&self) -> PathBuf {
        self.outputs_dir.join(&self.index_file)
    }

    /// Resolved path of the metadata file
    pub fn metadata_path(&self) -> PathBuf {
        self.outputs_dir.join(&self.metadata_file)
    }
}

/// Retrieval settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Hits per query when a single query is run
    pub top_k: usize,
    /// Hits per phrasing during expanded fan-out
    pub per_query_top_k: usize,
    /// Number of alternate phrasings requested from the expander
    pub expansion_variants: usize,
    /// Separator placed between retrieved documents in a prompt
    pub context_delimiter: String,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            per_query_top_k: 2,
            expansion_variants: 3,
            context_delimiter: "\n---\n".to_string(),
        }
    }
}

/// Reflection trigger policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReflectionConfig {
    /// Case-insensitive phrases signalling insufficient context
    pub markers: Vec<String>,
    /// Tag introducing a follow-up query in the model's answer
    pub suggested_query_tag: String,
    /// Phrases in an article review that trigger one revision round
    pub content_markers: Vec<String>,
}

impl Default for ReflectionConfig {
    fn default() -> Self {
        Self {
            markers: vec![
                "suggested query:".to_string(),
                "suggest".to_string(),
                "clarify".to_string(),
            ],
            suggested_query_tag: "suggested query:".to_string(),
            content_markers: vec!["add".to_string(), "clarify".to_string()],
        }
    }
}

/// Content generation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentConfig {
    /// Company named in generated copy
    pub company_name: String,
    /// Placeholder the model may emit instead of the company name
    pub company_placeholder: String,
    /// Region targeted by SEO articles
    pub region: String,
    /// Default article style
    pub default_style: String,
    /// Default article length
    pub default_length: String,
    /// Default word limit
    pub default_word_limit: u32,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            company_name: "WB White Insurance".to_string(),
            company_placeholder: "[Company Name]".to_string(),
            region: "Ontario, Canada".to_string(),
            default_style: "informative".to_string(),
            default_length: "short".to_string(),
            default_word_limit: 1000,
        }
    }
}

/// Google Docs export configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Google Docs API base URL
    pub base_url: String,
    /// OAuth access token with the documents scope; export is disabled without it
    pub access_token: Option<String>,
    /// Prefix for exported document titles
    pub title_prefix: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            base_url: "https://docs.googleapis.com/v1".to_string(),
            access_token: None,
            title_prefix: "WB WHITE INSURANCE".to_string(),
            timeout_secs: 30,
        }
    }
}
