//! HTTP request handlers for the clinical notes service.

use std::sync::Arc;

use axum::{extract::State, Json};
use cn_core::types::{HealthResponse, NoteRequest, NoteResponse};
use validator::Validate;

use crate::error::Result;
use crate::state::AppState;

/// Health check endpoint.
///
/// No side effects and no upstream calls; never fails under normal
/// operation.
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::healthy(env!("CARGO_PKG_VERSION")))
}

/// Process one clinical note: generate a summary and extract structured
/// entities.
#[utoipa::path(
    post,
    path = "/api/v1/notes/process",
    request_body = NoteRequest,
    responses(
        (status = 200, description = "Note processed", body = NoteResponse),
        (status = 422, description = "Request validation failed"),
        (status = 502, description = "Upstream model call or output handling failed")
    )
)]
pub async fn process_note(
    State(state): State<Arc<AppState>>,
    Json(request): Json<NoteRequest>
) -> Result<Json<NoteResponse>> {
    request.validate()?;

    tracing::info!(
        patient_id = %request.patient_id,
        note_chars = request.clinical_note.len(),
        "Processing clinical note"
    );

    let response = state.processor.process(&request).await?;
    Ok(Json(response))
}
