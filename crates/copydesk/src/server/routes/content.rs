//! Content generation endpoints

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::Result;
use crate::server::state::AppState;
use crate::types::{ArticleRequest, ArticleResponse, MarketingPostRequest, MarketingPostResponse};

/// POST /api/content - Generate an SEO article
pub async fn generate_article(
    State(state): State<AppState>,
    Json(request): Json<ArticleRequest>,
) -> Result<Json<ArticleResponse>> {
    let start = Instant::now();
    tracing::info!("Article: \"{}\"", request.topic);

    let response = state.content().article(&request).await?;

    tracing::info!(
        "Article saved as {} in {}ms",
        response.filename,
        start.elapsed().as_millis()
    );
    Ok(Json(response))
}

/// POST /api/marketing-post - Generate a social media post
pub async fn generate_marketing_post(
    State(state): State<AppState>,
    Json(request): Json<MarketingPostRequest>,
) -> Result<Json<MarketingPostResponse>> {
    tracing::info!("Marketing post: \"{}\" (export: {})", request.topic, request.export);
    let response = state.content().marketing_post(&request).await?;
    Ok(Json(response))
}
