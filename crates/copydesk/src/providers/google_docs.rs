//! Google Docs exporter
//!
//! Creates an empty document, then inserts the body at index 1 with a single
//! `batchUpdate`. Authentication is a pre-issued OAuth access token; obtaining
//! and refreshing it is left to the deployment.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::config::ExportConfig;
use crate::error::{Error, Result};

use super::export::DocumentExporter;

/// Google Docs API exporter
pub struct GoogleDocsExporter {
    client: Client,
    base_url: String,
    access_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedDocument {
    document_id: String,
}

impl GoogleDocsExporter {
    /// Create an exporter; `None` when no access token is configured
    pub fn from_config(config: &ExportConfig) -> Result<Option<Self>> {
        let Some(token) = config.access_token.as_deref().filter(|t| !t.is_empty()) else {
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Some(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: token.to_string(),
        }))
    }

    /// Public edit URL of a document
    pub fn document_url(document_id: &str) -> String {
        format!("https://docs.google.com/document/d/{}/edit", document_id)
    }

    async fn create(&self, title: &str) -> Result<String> {
        let response = self
            .client
            .post(format!("{}/documents", self.base_url))
            .bearer_auth(&self.access_token)
            .json(&json!({ "title": title }))
            .send()
            .await
            .map_err(|e| Error::Export(format!("Create request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Export(format!("Create failed: HTTP {} - {}", status, body)));
        }

        let created: CreatedDocument = response
            .json()
            .await
            .map_err(|e| Error::Export(format!("Failed to parse create response: {}", e)))?;
        Ok(created.document_id)
    }

    async fn insert_text(&self, document_id: &str, text: &str) -> Result<()> {
        let body = json!({
            "requests": [
                { "insertText": { "location": { "index": 1 }, "text": text } }
            ]
        });

        let response = self
            .client
            .post(format!("{}/documents/{}:batchUpdate", self.base_url, document_id))
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Export(format!("Update request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Export(format!("Update failed: HTTP {} - {}", status, body)));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentExporter for GoogleDocsExporter {
    async fn export(&self, title: &str, body: &str) -> Result<String> {
        let document_id = self.create(title).await?;
        self.insert_text(&document_id, body).await?;
        tracing::info!("Exported '{}' to Google Docs ({})", title, document_id);
        Ok(Self::document_url(&document_id))
    }

    fn name(&self) -> &str {
        "google-docs"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_without_token() {
        let config = ExportConfig::default();
        assert!(GoogleDocsExporter::from_config(&config).unwrap().is_none());

        let config = ExportConfig {
            access_token: Some(String::new()),
            ..Default::default()
        };
        assert!(GoogleDocsExporter::from_config(&config).unwrap().is_none());
    }

    #[test]
    fn test_document_url() {
        assert_eq!(
            GoogleDocsExporter::document_url("abc123"),
            "https://docs.google.com/document/d/abc123/edit"
        );
    }

    #[test]
    fn test_parse_created_document() {
        let created: CreatedDocument =
            serde_json::from_str(r#"{"documentId":"1x2y","title":"Post"}"#).unwrap();
        assert_eq!(created.document_id, "1x2y");
    }
}
