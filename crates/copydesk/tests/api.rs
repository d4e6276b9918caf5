//! End-to-end tests over the HTTP router with in-process providers

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use copydesk::{
    config::{RagConfig, StorageConfig},
    providers::{DocumentExporter, HashEmbedder, RecordingExporter, ScriptedLlm},
    server::{state::AppState, RagServer},
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

struct Harness {
    dir: TempDir,
    router: Router,
    llm: Arc<ScriptedLlm>,
}

fn harness(llm: ScriptedLlm, exporter: Option<Arc<dyn DocumentExporter>>) -> Harness {
    let dir = TempDir::new().unwrap();
    let config = RagConfig {
        storage: StorageConfig::in_dir(dir.path()),
        ..Default::default()
    };
    let llm = Arc::new(llm);
    let state = AppState::with_providers(
        config,
        Arc::new(HashEmbedder::new(64)),
        llm.clone(),
        exporter,
    )
    .unwrap();
    let router = RagServer::with_state(state).build_router();
    Harness { dir, router, llm }
}

impl Harness {
    fn write_artifact(&self, name: &str, text: &str) {
        std::fs::write(self.dir.path().join(name), text).unwrap();
    }

    async fn send(&self, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }
}

#[tokio::test]
async fn health_reports_ok() {
    let h = harness(ScriptedLlm::new(""), None);
    let (status, body) = h.send("GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "OK");
}

#[tokio::test]
async fn ready_follows_backend_health() {
    let h = harness(ScriptedLlm::new("").offline(), None);
    let (status, _) = h.send("GET", "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let h = harness(ScriptedLlm::new(""), None);
    let (_, info) = h.send("GET", "/api/info", None).await;
    assert_eq!(info["ready"], false);
    let (status, _) = h.send("GET", "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
    let (_, info) = h.send("GET", "/api/info", None).await;
    assert_eq!(info["ready"], true);
}

#[tokio::test]
async fn info_reports_providers_and_export() {
    let h = harness(ScriptedLlm::new(""), Some(Arc::new(RecordingExporter::new())));
    let (status, info) = h.send("GET", "/api/info", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(info["providers"]["embeddings"], "hash");
    assert_eq!(info["providers"]["completions"], "scripted");
    assert_eq!(info["export_enabled"], true);

    let h = harness(ScriptedLlm::new(""), None);
    let (_, info) = h.send("GET", "/api/info", None).await;
    assert_eq!(info["export_enabled"], false);
}

#[tokio::test]
async fn rag_on_empty_store_is_an_explicit_error() {
    let h = harness(ScriptedLlm::new("- a\n- b"), None);
    let (status, body) = h.send("POST", "/api/rag", Some(json!({ "query": "flood cover?" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "no_index");
}

#[tokio::test]
async fn ingest_then_answer() {
    let llm = ScriptedLlm::new("Premiums start at $40 a month.")
        .on("alternative phrasings", "1. home insurance price\n2. house cover premium");
    let h = harness(llm, None);
    h.write_artifact("pricing_20240101_0900.txt", "Home insurance pricing starts at $40 a month.");
    h.write_artifact("claims_20240101_0900.txt", "Claims are filed online in five minutes.");

    let (status, report) = h.send("POST", "/api/embeddings", Some(json!({ "topic": "Pricing" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(report["source_id"].as_str().unwrap().ends_with("pricing_20240101_0900.txt"));
    assert_eq!(report["index_size"], 1);

    let (status, answer) = h
        .send("POST", "/api/rag", Some(json!({ "query": "How much is home insurance?" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(answer["answer"], "Premiums start at $40 a month.");
    assert_eq!(answer["reflected"], false);

    let queries = answer["expanded_queries"].as_array().unwrap();
    assert_eq!(queries[0], "How much is home insurance?");
    assert_eq!(queries.len(), 3);

    // Every leg finds the same single record; it is listed once
    let sources = answer["sources"].as_array().unwrap();
    assert_eq!(sources.len(), 1);

    let answer_prompt = h.llm.prompts().pop().unwrap();
    assert!(answer_prompt.contains("Home insurance pricing starts at $40 a month."));
}

#[tokio::test]
async fn ingest_unknown_topic_is_not_found() {
    let h = harness(ScriptedLlm::new(""), None);
    let (status, body) = h.send("POST", "/api/embeddings", Some(json!({ "topic": "ghost" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "not_found");

    let (status, body) = h.send("GET", "/api/embeddings", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_count"], 0);
    assert!(body["dimension"].is_null());
}

#[tokio::test]
async fn search_returns_at_most_k_sorted_hits() {
    let h = harness(ScriptedLlm::new(""), None);
    for (name, text) in [
        ("pricing.txt", "home insurance pricing"),
        ("claims.txt", "home insurance claims"),
        ("auto.txt", "auto insurance discounts"),
    ] {
        h.write_artifact(name, text);
    }
    let (status, report) = h.send("POST", "/api/embeddings/backfill", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(report["ingested"].as_array().unwrap().len(), 3);

    let (status, body) = h
        .send("POST", "/api/search", Some(json!({ "query": "home insurance pricing", "top_k": 2 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    let hits = body["hits"].as_array().unwrap();
    assert_eq!(hits.len(), 2);
    assert!(hits[0]["source_id"].as_str().unwrap().ends_with("pricing.txt"));
    assert!(hits[0]["distance"].as_f64().unwrap() <= hits[1]["distance"].as_f64().unwrap());

    let (_, listing) = h.send("GET", "/api/embeddings", None).await;
    assert_eq!(listing["total_count"], 3);
    assert_eq!(listing["dimension"], 64);
}

#[tokio::test]
async fn article_is_saved_and_downloadable() {
    let h = harness(ScriptedLlm::new("# Flood cover\nTalk to [Company Name]."), None);
    let (status, body) = h
        .send("POST", "/api/content", Some(json!({ "topic": "Flood cover", "faqs": true })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"], "# Flood cover\nTalk to WB White Insurance.");

    let url = body["download_url"].as_str().unwrap().to_string();
    let request = Request::builder().uri(&url).body(Body::empty()).unwrap();
    let response = h.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .starts_with("attachment"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("Talk to WB White Insurance."));

    // The saved article can itself be ingested under its topic
    let (status, _) = h.send("POST", "/api/embeddings", Some(json!({ "topic": "flood" }))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn agentic_article_is_reviewed_once() {
    let llm = ScriptedLlm::new("# Flood cover")
        .on("Is this content sufficient", "Clarify who pays the deductible.")
        .on("Add the missing details", "The policyholder pays the deductible.");
    let h = harness(llm, None);
    let (status, body) = h
        .send("POST", "/api/content", Some(json!({ "topic": "Flood cover", "agentic": true })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["revised"], true);
    assert_eq!(body["content"], "# Flood cover\n\nThe policyholder pays the deductible.");
    assert_eq!(h.llm.calls(), 3);
}

#[tokio::test]
async fn download_rejects_traversal() {
    let h = harness(ScriptedLlm::new(""), None);
    let (status, _) = h.send("GET", "/api/download/..%2Fvectors.index", None).await;
    assert!(status == StatusCode::BAD_REQUEST || status == StatusCode::NOT_FOUND);

    let (status, body) = h.send("GET", "/api/download/missing.txt", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "not_found");
}

#[tokio::test]
async fn marketing_post_export_error_is_reported_beside_post() {
    let h = harness(
        ScriptedLlm::new("Spring storms are coming. Call us!"),
        Some(Arc::new(RecordingExporter::failing())),
    );
    let (status, body) = h
        .send(
            "POST",
            "/api/marketing-post",
            Some(json!({ "topic": "Storm season", "export": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post"], "Spring storms are coming. Call us!");
    assert!(body.get("doc_url").is_none());
    assert!(body["error"].as_str().is_some());
}
