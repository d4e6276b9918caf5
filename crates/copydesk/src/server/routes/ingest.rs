//! Embedding endpoints: ingest, list and backfill

use axum::{extract::State, Json};
use std::time::Instant;

use crate::error::{Error, Result};
use crate::server::state::AppState;
use crate::types::{BackfillReport, IngestReport, IngestRequest, RecordListResponse};

/// POST /api/embeddings - Embed the newest artifact for a topic
pub async fn create_embedding(
    State(state): State<AppState>,
    Json(request): Json<IngestRequest>,
) -> Result<Json<IngestReport>> {
    let start = Instant::now();
    tracing::info!("Ingest: \"{}\"", request.topic);

    let report = state.retrieval().ingest(&request.topic).await?;

    tracing::info!(
        "Ingested {} in {}ms",
        report.source_id,
        start.elapsed().as_millis()
    );
    Ok(Json(report))
}

/// GET /api/embeddings - List stored records
pub async fn list_embeddings(State(state): State<AppState>) -> Result<Json<RecordListResponse>> {
    let store = state.retrieval().store().clone();
    let (dimension, records) =
        tokio::task::spawn_blocking(move || Ok::<_, Error>((store.dimension()?, store.records()?)))
            .await
            .map_err(|e| Error::internal(format!("list task failed: {}", e)))??;

    Ok(Json(RecordListResponse {
        total_count: records.len(),
        dimension,
        records,
    }))
}

/// POST /api/embeddings/backfill - Embed every artifact not yet stored
pub async fn backfill_embeddings(State(state): State<AppState>) -> Result<Json<BackfillReport>> {
    let start = Instant::now();
    let report = state.retrieval().backfill().await?;
    tracing::info!("Backfill finished in {}ms", start.elapsed().as_millis());
    Ok(Json(report))
}
