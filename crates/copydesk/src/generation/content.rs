//! Marketing content agents: SEO articles and social posts

use serde_json::json;
use std::sync::Arc;

use crate::config::ContentConfig;
use crate::error::{Error, Result};
use crate::providers::{DocumentExporter, LlmProvider};
use crate::storage::{safe_topic, timestamp, Artifact, ArtifactWriter};
use crate::types::{ArticleRequest, ArticleResponse, MarketingPostRequest, MarketingPostResponse};

use super::prompt::PromptBuilder;
use super::reflection::ReflectionPolicy;

const ARTICLE_AGENT: &str = "SEO and GEO Generator";

/// Generates marketing content and saves it as artifacts
pub struct ContentGenerator {
    llm: Arc<dyn LlmProvider>,
    writer: ArtifactWriter,
    exporter: Option<Arc<dyn DocumentExporter>>,
    config: ContentConfig,
    review: ReflectionPolicy,
    export_title_prefix: String,
}

impl ContentGenerator {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        writer: ArtifactWriter,
        exporter: Option<Arc<dyn DocumentExporter>>,
        config: ContentConfig,
        review: ReflectionPolicy,
        export_title_prefix: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            writer,
            exporter,
            config,
            review,
            export_title_prefix: export_title_prefix.into(),
        }
    }

    /// Whether marketing posts can be exported
    pub fn can_export(&self) -> bool {
        self.exporter.is_some()
    }

    /// Write an SEO article and save it as `<safe_topic>_<timestamp>.txt`.
    ///
    /// With `agentic` set, the draft is reviewed once; a review asking for
    /// more gets one further completion appended to the draft.
    pub async fn article(&self, request: &ArticleRequest) -> Result<ArticleResponse> {
        let topic = request.topic.trim();
        if topic.is_empty() {
            return Err(Error::Validation("topic must not be empty".to_string()));
        }

        let style = request.style.as_deref().unwrap_or(&self.config.default_style);
        let length = request.length.as_deref().unwrap_or(&self.config.default_length);
        let word_limit = request.word_limit.unwrap_or(self.config.default_word_limit);

        let prompt = PromptBuilder::build_article_prompt(
            topic,
            style,
            length,
            request.faqs,
            word_limit,
            &self.config.region,
            &request.context,
        );
        let mut output = self.llm.complete(&prompt).await?;
        let mut revised = false;
        if request.agentic {
            if let Some(addition) = self.revise(&output).await {
                output = format!("{}\n\n{}", output.trim_end(), addition.trim());
                revised = true;
            }
        }
        let content = self.brand(&output);

        let payload = json!({
            "topic": topic,
            "style": style,
            "length": length,
            "faqs": request.faqs,
            "word_limit": word_limit,
            "agentic": request.agentic,
        });
        let artifact = Artifact {
            agent: ARTICLE_AGENT,
            payload: &payload,
            prompt: &prompt,
            context: &request.context,
            output: &content,
        };
        let filename = format!("{}_{}.txt", safe_topic(topic), timestamp());
        let filename = self.writer.write(&artifact, Some(filename)).await?;

        Ok(ArticleResponse {
            download_url: format!("/api/download/{}", filename),
            content,
            filename,
            revised,
        })
    }

    /// One review round over `draft`: the missing material, if any.
    ///
    /// Review failures keep the draft as it is.
    async fn revise(&self, draft: &str) -> Option<String> {
        let review = match self
            .llm
            .complete(&PromptBuilder::build_content_review_prompt(draft))
            .await
        {
            Ok(review) => review,
            Err(e) => {
                tracing::warn!("Article review failed, keeping draft: {}", e);
                return None;
            }
        };
        if !self.review.wants_more_context(&review) {
            tracing::debug!("Article review found the draft sufficient");
            return None;
        }

        let prompt = PromptBuilder::build_content_revision_prompt(draft, &review);
        match self.llm.complete(&prompt).await {
            Ok(addition) if !addition.trim().is_empty() => Some(addition),
            Ok(_) => None,
            Err(e) => {
                tracing::warn!("Article revision failed, keeping draft: {}", e);
                None
            }
        }
    }

    /// Write a social media post, optionally exporting it.
    ///
    /// Export problems are reported in `error`; the post is still returned.
    pub async fn marketing_post(&self, request: &MarketingPostRequest) -> Result<MarketingPostResponse> {
        let topic = request.topic.trim();
        if topic.is_empty() {
            return Err(Error::Validation("topic must not be empty".to_string()));
        }

        let prompt = PromptBuilder::build_marketing_post_prompt(
            &self.config.company_name,
            topic,
            &request.style,
            &request.length,
        );
        let post = self.brand(&self.llm.complete(&prompt).await?);

        let mut response = MarketingPostResponse {
            post,
            doc_url: None,
            error: None,
        };
        if !request.export {
            return Ok(response);
        }

        match &self.exporter {
            Some(exporter) => {
                let title = format!("{} - {}", self.export_title_prefix, topic);
                match exporter.export(&title, &response.post).await {
                    Ok(url) => response.doc_url = Some(url),
                    Err(e) => {
                        tracing::warn!("Export via {} failed: {}", exporter.name(), e);
                        response.error = Some(e.to_string());
                    }
                }
            }
            None => {
                response.error = Some("Document export is not configured".to_string());
            }
        }

        Ok(response)
    }

    fn brand(&self, text: &str) -> String {
        if self.config.company_placeholder.is_empty() {
            return text.to_string();
        }
        text.replace(&self.config.company_placeholder, &self.config.company_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReflectionConfig;
    use crate::providers::{RecordingExporter, ScriptedLlm};
    use tempfile::TempDir;

    fn generator(
        dir: &TempDir,
        llm: Arc<ScriptedLlm>,
        exporter: Option<Arc<dyn DocumentExporter>>,
    ) -> ContentGenerator {
        ContentGenerator::new(
            llm,
            ArtifactWriter::new(dir.path()),
            exporter,
            ContentConfig::default(),
            ReflectionPolicy::for_content(&ReflectionConfig::default()),
            "WB WHITE INSURANCE",
        )
    }

    #[tokio::test]
    async fn test_article_writes_branded_artifact() {
        let dir = TempDir::new().unwrap();
        let llm = Arc::new(ScriptedLlm::new("# Flood cover\nCall [Company Name] today."));
        let generator = generator(&dir, llm.clone(), None);

        let request = ArticleRequest {
            topic: "Flood cover: Ontario".to_string(),
            faqs: true,
            ..Default::default()
        };
        let response = generator.article(&request).await.unwrap();

        assert!(response.content.contains("Call WB White Insurance today."));
        assert!(response.filename.starts_with("Flood_cover__Ontario_"));
        assert_eq!(response.download_url, format!("/api/download/{}", response.filename));

        let saved = std::fs::read_to_string(dir.path().join(&response.filename)).unwrap();
        assert!(saved.contains("Call WB White Insurance today."));
        assert!(llm.prompts()[0].contains("1000 words maximum"));
    }

    #[tokio::test]
    async fn test_agentic_article_appends_one_revision() {
        let dir = TempDir::new().unwrap();
        let llm = Arc::new(
            ScriptedLlm::new("# Flood cover\nCall [Company Name].")
                .on("Is this content sufficient", "Add a section on deductibles.")
                .on("Add the missing details", "## Deductibles\nThey start at $500."),
        );
        let generator = generator(&dir, llm.clone(), None);

        let request = ArticleRequest {
            topic: "Flood cover".to_string(),
            agentic: true,
            ..Default::default()
        };
        let response = generator.article(&request).await.unwrap();

        assert_eq!(llm.calls(), 3);
        assert!(response.revised);
        assert_eq!(
            response.content,
            "# Flood cover\nCall WB White Insurance.\n\n## Deductibles\nThey start at $500."
        );
        assert!(llm.prompts()[2].contains("Add a section on deductibles."));

        let saved = std::fs::read_to_string(dir.path().join(&response.filename)).unwrap();
        assert!(saved.contains("They start at $500."));
    }

    #[tokio::test]
    async fn test_agentic_article_sufficient_draft_is_kept() {
        let dir = TempDir::new().unwrap();
        let llm = Arc::new(
            ScriptedLlm::new("# Flood cover").on("Is this content sufficient", "Yes, it is complete."),
        );
        let generator = generator(&dir, llm.clone(), None);

        let request = ArticleRequest {
            topic: "Flood cover".to_string(),
            agentic: true,
            ..Default::default()
        };
        let response = generator.article(&request).await.unwrap();
        assert_eq!(llm.calls(), 2);
        assert!(!response.revised);
        assert_eq!(response.content, "# Flood cover");
    }

    #[tokio::test]
    async fn test_agentic_review_failure_keeps_draft() {
        let dir = TempDir::new().unwrap();
        let llm = Arc::new(ScriptedLlm::new("# Flood cover").fail_on("Is this content sufficient"));
        let generator = generator(&dir, llm.clone(), None);

        let request = ArticleRequest {
            topic: "Flood cover".to_string(),
            agentic: true,
            ..Default::default()
        };
        let response = generator.article(&request).await.unwrap();
        assert_eq!(llm.calls(), 2);
        assert_eq!(response.content, "# Flood cover");
    }

    #[tokio::test]
    async fn test_article_without_agentic_makes_one_call() {
        let dir = TempDir::new().unwrap();
        let llm = Arc::new(ScriptedLlm::new("Please clarify and add more."));
        let generator = generator(&dir, llm.clone(), None);

        let request = ArticleRequest {
            topic: "Flood cover".to_string(),
            ..Default::default()
        };
        let response = generator.article(&request).await.unwrap();
        assert_eq!(llm.calls(), 1);
        assert!(!response.revised);
    }

    #[tokio::test]
    async fn test_article_requires_topic() {
        let dir = TempDir::new().unwrap();
        let generator = generator(&dir, Arc::new(ScriptedLlm::new("x")), None);
        let result = generator.article(&ArticleRequest::default()).await;
        assert!(matches!(result, Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_marketing_post_export() {
        let dir = TempDir::new().unwrap();
        let exporter = Arc::new(RecordingExporter::new());
        let generator = generator(
            &dir,
            Arc::new(ScriptedLlm::new("Stay dry this spring!")),
            Some(exporter.clone()),
        );

        let request = MarketingPostRequest {
            topic: "Flood cover".to_string(),
            style: "Engaging".to_string(),
            length: "Short".to_string(),
            export: true,
        };
        let response = generator.marketing_post(&request).await.unwrap();
        assert_eq!(response.post, "Stay dry this spring!");
        assert!(response.doc_url.is_some());
        assert!(response.error.is_none());
        assert_eq!(exporter.documents()[0].0, "WB WHITE INSURANCE - Flood cover");
    }

    #[tokio::test]
    async fn test_marketing_post_export_failure_keeps_post() {
        let dir = TempDir::new().unwrap();
        let generator = generator(
            &dir,
            Arc::new(ScriptedLlm::new("Stay dry!")),
            Some(Arc::new(RecordingExporter::failing())),
        );

        let request = MarketingPostRequest {
            topic: "Flood".to_string(),
            style: "Engaging".to_string(),
            length: "Short".to_string(),
            export: true,
        };
        let response = generator.marketing_post(&request).await.unwrap();
        assert_eq!(response.post, "Stay dry!");
        assert!(response.doc_url.is_none());
        assert!(response.error.unwrap().contains("export"));
    }
}
