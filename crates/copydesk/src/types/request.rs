//! HTTP request bodies

use serde::{Deserialize, Serialize};

/// Ingest request: embed the newest artifact matching `topic`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    pub topic: String,
}

/// Single-leg similarity search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Number of hits (defaults to `retrieval.top_k`)
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// Question answered from stored artifacts
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagRequest {
    pub query: String,
    /// Allow one reflection round (default: true)
    #[serde(default = "default_agentic")]
    pub agentic: bool,
    /// Hits per expanded phrasing (defaults to `retrieval.per_query_top_k`)
    #[serde(default)]
    pub top_k: Option<usize>,
}

fn default_agentic() -> bool {
    true
}

impl RagRequest {
    /// Create an agentic request for `query`
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            agentic: true,
            top_k: None,
        }
    }
}

/// SEO article generation request
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArticleRequest {
    pub topic: String,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub length: Option<String>,
    /// Append an FAQ section
    #[serde(default)]
    pub faqs: bool,
    /// Maximum word count
    #[serde(default)]
    pub word_limit: Option<u32>,
    /// Existing material the article should draw on
    #[serde(default)]
    pub context: String,
    /// Review the draft once and append missing details
    #[serde(default)]
    pub agentic: bool,
}

/// Social media post request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketingPostRequest {
    pub topic: String,
    #[serde(default = "default_post_style")]
    pub style: String,
    #[serde(default = "default_post_length")]
    pub length: String,
    /// Publish the post to the document service
    #[serde(default)]
    pub export: bool,
}

fn default_post_style() -> String {
    "Engaging".to_string()
}

fn default_post_length() -> String {
    "Short".to_string()
}
