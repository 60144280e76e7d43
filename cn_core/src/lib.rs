//! Shared types and traits for the clinical notes service.
//!
//! Everything request-scoped flows through the types defined here; the
//! `ChatClient` trait is the seam between the orchestration layer and the
//! outbound LLM transport.

pub mod traits;
pub mod types;

pub use traits::ChatClient;
pub use types::{
    ChatReply, ChatRequest, DiagnosisEntity, ExtractedEntities, HealthResponse, MedicationEntity,
    NoteRequest, NoteResponse, ProcedureEntity, TaskKind, TokenUsage,
};
