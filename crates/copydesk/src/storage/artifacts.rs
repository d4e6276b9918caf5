//! Plain-text artifacts written to the outputs directory
//!
//! Every generated piece of content is saved with the request that produced
//! it. These files are what the resolver later finds and ingests.

use chrono::Local;
use serde_json::Value;
use std::path::PathBuf;

use crate::error::{Error, Result};

/// Maximum length of a topic-derived file name stem
const SAFE_TOPIC_LEN: usize = 50;

/// One generated artifact
#[derive(Debug, Clone)]
pub struct Artifact<'a> {
    /// Name of the agent that produced the output
    pub agent: &'a str,
    /// Request as received
    pub payload: &'a Value,
    pub prompt: &'a str,
    /// User-supplied context
    pub context: &'a str,
    pub output: &'a str,
}

/// Writes sectioned `.txt` artifacts into one directory
#[derive(Debug, Clone)]
pub struct ArtifactWriter {
    dir: PathBuf,
}

impl ArtifactWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Write `artifact` and return the file name used.
    ///
    /// Without `filename` the name is `<agent>_<YYYYMMDD_HHMMSS>.txt`.
    pub async fn write(&self, artifact: &Artifact<'_>, filename: Option<String>) -> Result<String> {
        let timestamp = timestamp();
        let filename =
            filename.unwrap_or_else(|| format!("{}_{}.txt", artifact.agent.replace(' ', "_"), timestamp));

        if filename.contains(['/', '\\']) || filename.contains("..") {
            return Err(Error::Validation(format!("invalid artifact name: {}", filename)));
        }

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&filename);
        tokio::fs::write(&path, render(artifact, &timestamp)).await?;

        tracing::info!("Wrote artifact {}", path.display());
        Ok(filename)
    }
}

/// Local time as `YYYYMMDD_HHMMSS`
pub fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

/// Replace everything outside `[A-Za-z0-9_-]` with `_`, capped at 50 chars
pub fn safe_topic(topic: &str) -> String {
    topic
        .chars()
        .take(SAFE_TOPIC_LEN)
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
        .collect()
}

fn render(artifact: &Artifact<'_>, timestamp: &str) -> String {
    let payload = serde_json::to_string_pretty(artifact.payload)
        .unwrap_or_else(|_| artifact.payload.to_string());

    format!(
        r#"========================
AGENT: {agent}
========================

REQUEST PAYLOAD
------------------------
{payload}

FULL PROMPT
------------------------
{prompt}

CONTEXT PROVIDED
------------------------
{context}

GENERATED OUTPUT
------------------------
{output}

========================
File generated on: {timestamp}
========================
"#,
        agent = artifact.agent,
        payload = payload,
        prompt = artifact.prompt.trim(),
        context = artifact.context,
        output = artifact.output,
        timestamp = timestamp
    )
}
