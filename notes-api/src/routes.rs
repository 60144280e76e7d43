//! Route definitions for the clinical notes service.

use axum::{
    routing::{get, post},
    Json, Router
};
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer
};
use utoipa::OpenApi;

use crate::handlers;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(handlers::health, handlers::process_note),
    components(schemas(
        cn_core::types::NoteRequest,
        cn_core::types::NoteResponse,
        cn_core::types::ExtractedEntities,
        cn_core::types::MedicationEntity,
        cn_core::types::DiagnosisEntity,
        cn_core::types::ProcedureEntity,
        cn_core::types::HealthResponse
    )),
    tags(
        (name = "notes", description = "Clinical note processing API")
    )
)]
pub struct ApiDoc;

/// Creates the Axum router with all routes configured.
pub fn create_router(state: Arc<AppState>) -> Router {
    // Permissive CORS, matching the original deployment posture.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_v1 = Router::new().route("/notes/process", post(handlers::process_note));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/api-docs/openapi.json", get(openapi_doc))
        .nest("/api/v1", api_v1)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn openapi_doc() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
