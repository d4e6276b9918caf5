//! Deterministic in-process providers for tests and offline runs

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::export::DocumentExporter;
use super::llm::LlmProvider;

/// Bag-of-words embedder: each lowercase word is hashed into one of
/// `dimensions` buckets and the counts are L2-normalised.
///
/// Texts sharing words land close together, which is enough to exercise
/// nearest-neighbour ordering without a network backend.
pub struct HashEmbedder {
    dimensions: usize,
    fail_on: Vec<String>,
    short_on: Vec<String>,
    calls: Mutex<Vec<String>>,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            fail_on: Vec::new(),
            short_on: Vec::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Fail with an embedding error for any text containing `needle`
    pub fn fail_on(mut self, needle: impl Into<String>) -> Self {
        self.fail_on.push(needle.into().to_lowercase());
        self
    }

    /// Return a vector one element short for any text containing `needle`
    pub fn short_on(mut self, needle: impl Into<String>) -> Self {
        self.short_on.push(needle.into().to_lowercase());
        self
    }

    /// Texts embedded so far
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Embed synchronously
    pub fn vector_for(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        for word in text
            .to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            vector[fnv1a(word) as usize % self.dimensions] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

fn fnv1a(word: &str) -> u64 {
    word.bytes().fold(0xcbf29ce484222325u64, |hash, byte| {
        (hash ^ byte as u64).wrapping_mul(0x100000001b3)
    })
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.lock().push(text.to_string());
        let lower = text.to_lowercase();
        if let Some(needle) = self.fail_on.iter().find(|n| lower.contains(n.as_str())) {
            return Err(Error::embedding(format!("scripted failure on '{}'", needle)));
        }
        let mut vector = self.vector_for(text);
        if self.short_on.iter().any(|n| lower.contains(n.as_str())) {
            vector.pop();
        }
        Ok(vector)
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "hash"
    }
}

enum Reply {
    Text(String),
    Fail(String),
}

/// Completion backend answering from a rule list.
///
/// The first rule whose needle occurs in the prompt wins; otherwise the
/// default reply is returned. Every prompt is recorded.
pub struct ScriptedLlm {
    rules: Vec<(String, Reply)>,
    default: String,
    reachable: bool,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlm {
    pub fn new(default: impl Into<String>) -> Self {
        Self {
            rules: Vec::new(),
            default: default.into(),
            reachable: true,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Report the backend as unreachable from `health_check`
    pub fn offline(mut self) -> Self {
        self.reachable = false;
        self
    }

    /// Reply with `reply` when the prompt contains `needle`
    pub fn on(mut self, needle: impl Into<String>, reply: impl Into<String>) -> Self {
        self.rules.push((needle.into(), Reply::Text(reply.into())));
        self
    }

    /// Fail when the prompt contains `needle`
    pub fn fail_on(mut self, needle: impl Into<String>) -> Self {
        let needle = needle.into();
        let message = format!("scripted failure on '{}'", needle);
        self.rules.push((needle, Reply::Fail(message)));
        self
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    /// Number of completion calls so far
    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        match self.rules.iter().find(|(needle, _)| prompt.contains(needle.as_str())) {
            Some((_, Reply::Text(text))) => Ok(text.clone()),
            Some((_, Reply::Fail(message))) => Err(Error::llm(message.clone())),
            None => Ok(self.default.clone()),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(self.reachable)
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Exporter that records documents instead of publishing them
#[derive(Default)]
pub struct RecordingExporter {
    fail: bool,
    documents: Mutex<Vec<(String, String)>>,
}

impl RecordingExporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// An exporter whose every call fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            documents: Mutex::new(Vec::new()),
        }
    }

    /// `(title, body)` pairs exported so far
    pub fn documents(&self) -> Vec<(String, String)> {
        self.documents.lock().clone()
    }
}

#[async_trait]
impl DocumentExporter for RecordingExporter {
    async fn export(&self, title: &str, body: &str) -> Result<String> {
        if self.fail {
            return Err(Error::Export("scripted export failure".to_string()));
        }
        let mut documents = self.documents.lock();
        documents.push((title.to_string(), body.to_string()));
        Ok(format!("https://docs.example.test/d/{}/edit", documents.len()))
    }

    fn name(&self) -> &str {
        "recording"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_embedder_is_unit_length_and_deterministic() {
        let embedder = HashEmbedder::new(32);
        let a = embedder.vector_for("Home insurance pricing in Ontario");
        let b = embedder.vector_for("Home insurance pricing in Ontario");
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[tokio::test]
    async fn test_scripted_llm_rules() {
        let llm = ScriptedLlm::new("default")
            .on("alternative", "- a\n- b")
            .fail_on("boom");

        assert_eq!(llm.complete("give alternative phrasings").await.unwrap(), "- a\n- b");
        assert!(llm.complete("boom").await.is_err());
        assert_eq!(llm.complete("anything").await.unwrap(), "default");
        assert_eq!(llm.calls(), 3);
    }
}
