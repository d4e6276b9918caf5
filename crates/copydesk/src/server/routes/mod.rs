//! API routes for the copydesk server

pub mod content;
pub mod files;
pub mod ingest;
pub mod query;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Content agents
        .route("/content", post(content::generate_article))
        .route("/marketing-post", post(content::generate_marketing_post))
        .route("/download/:filename", get(files::download))
        // Embeddings
        .route(
            "/embeddings",
            post(ingest::create_embedding).get(ingest::list_embeddings),
        )
        .route("/embeddings/backfill", post(ingest::backfill_embeddings))
        // Retrieval
        .route("/search", post(query::search))
        .route("/rag", post(query::query_rag))
        // Info
        .route("/info", get(info))
}

/// API info endpoint
async fn info(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "copydesk",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Marketing copy generation with retrieval over past artifacts",
        "providers": {
            "embeddings": state.embedding_provider().name(),
            "completions": state.llm_provider().name(),
            "model": state.llm_provider().model()
        },
        "export_enabled": state.content().can_export(),
        "ready": state.is_ready(),
        "endpoints": {
            "POST /api/content": "Generate an SEO article and save it as an artifact",
            "POST /api/marketing-post": "Generate a social media post (optional export)",
            "GET /api/download/:filename": "Download a saved artifact",
            "POST /api/embeddings": "Embed the newest artifact for a topic",
            "GET /api/embeddings": "List stored embeddings",
            "POST /api/embeddings/backfill": "Embed every artifact not yet stored",
            "POST /api/search": "Nearest artifacts for a query",
            "POST /api/rag": "Answer a question from stored artifacts"
        },
        "features": {
            "query_expansion": "Each question is retrieved under several phrasings",
            "reflection": "One follow-up retrieval when the first answer asks for it",
            "duplicate_policy": "Re-ingesting a source replaces its old entry by default"
        }
    }))
}
