//! Search and RAG endpoints

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{RagAnswer, RagRequest, SearchRequest, SearchResponse};

/// POST /api/search - Single-leg similarity search
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>> {
    let start = Instant::now();
    let query = request.query.trim();
    if query.is_empty() {
        return Err(Error::Validation("query must not be empty".to_string()));
    }

    let top_k = request.top_k.unwrap_or(state.config().retrieval.top_k);
    tracing::info!("Search: \"{}\" (top_k: {})", query, top_k);

    let hits = state.retrieval().search(query, top_k).await?;

    Ok(Json(SearchResponse {
        query: query.to_string(),
        hits,
        processing_time_ms: start.elapsed().as_millis() as u64,
    }))
}

/// POST /api/rag - Answer a question from stored artifacts
pub async fn query_rag(
    State(state): State<AppState>,
    Json(request): Json<RagRequest>,
) -> Result<Json<RagAnswer>> {
    tracing::info!("RAG query: \"{}\" (agentic: {})", request.query, request.agentic);
    let answer = state.pipeline().answer(&request).await?;
    Ok(Json(answer))
}
