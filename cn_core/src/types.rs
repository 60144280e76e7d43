use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;
use validator::Validate;

/// The two LLM tasks the service issues per note.
///
/// Each task maps to its own model deployment and sampling profile; see
/// `llm::TaskProfile`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum TaskKind {
    Summarize,
    Extract,
}

/// One chat-style completion request, fully resolved (deployment and
/// sampling parameters already chosen for the task at hand).
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub task: TaskKind,
    pub deployment: String,
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Token accounting reported by the provider, when available.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The raw text of a model reply plus its usage accounting.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub content: String,
    pub usage: Option<TokenUsage>,
}

/// Inbound request to process one clinical note.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct NoteRequest {
    /// Free-text clinical note to process.
    #[validate(
        length(min = 10, message = "clinical note must be at least 10 characters"),
        custom(function = "validate_clinical_note")
    )]
    pub clinical_note: String,

    /// Opaque patient identifier.
    pub patient_id: String,

    /// Opaque visit identifier, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_id: Option<String>,
}

fn validate_clinical_note(value: &str) -> Result<(), validator::ValidationError> {
    if value.trim().is_empty() {
        return Err(validator::ValidationError::new("blank_clinical_note")
            .with_message("clinical note must not be blank".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MedicationEntity {
    pub name: String,
    #[serde(default)]
    pub dosage: Option<String>,
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub route: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DiagnosisEntity {
    pub condition: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub certainty: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProcedureEntity {
    pub name: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Structured entities recovered from one note.
///
/// Every collection is always present in the serialized form; a field the
/// model omitted normalizes to an empty collection, never to null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ExtractedEntities {
    #[serde(default)]
    pub medications: Vec<MedicationEntity>,
    #[serde(default)]
    pub diagnoses: Vec<DiagnosisEntity>,
    #[serde(default)]
    pub procedures: Vec<ProcedureEntity>,
    #[serde(default)]
    pub allergies: Vec<String>,
    /// Free-form vital signs, passed through without schema enforcement.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub vitals: serde_json::Map<String, serde_json::Value>,
}

/// Result of processing one clinical note.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NoteResponse {
    /// Freshly generated uuid-v4, unique per invocation.
    pub request_id: String,
    pub patient_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit_id: Option<String>,
    pub summary: String,
    pub entities: ExtractedEntities,
    pub processed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy(version: &str) -> Self {
        Self {
            status: "healthy".to_string(),
            version: version.to_string(),
            timestamp: Utc::now(),
        }
    }
}
