//! Document export trait for publishing generated copy

use async_trait::async_trait;
use crate::error::Result;

/// Trait for publishing text to an external document service
///
/// Implementations:
/// - `GoogleDocsExporter`: Google Docs API
#[async_trait]
pub trait DocumentExporter: Send + Sync {
    /// Create a document with `title` holding `body`; returns its URL
    async fn export(&self, title: &str, body: &str) -> Result<String>;

    /// Get exporter name for logging
    fn name(&self) -> &str;
}
