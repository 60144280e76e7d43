//! Clinical Notes Summarizer & Insights Extractor.
//!
//! HTTP surface over the note-processing core: one processing endpoint, a
//! health check, and the generated OpenAPI document. Stateless between
//! requests; the only shared resource is the outbound HTTP client.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;

pub use error::{ApiError, ErrorResponse};
pub use routes::create_router;
pub use server::{run_from_env, run_server};
pub use state::AppState;
