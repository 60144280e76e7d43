use chrono::Utc;
use cn_core::types::{NoteRequest, NoteResponse, TaskKind};
use errors::ProcessError;
use llm::{extract_json, ResilientLlmClient};
use tracing::{info_span, Instrument};
use uuid::Uuid;

use crate::validate::validate_entities;

/// Orchestrates the two LLM tasks for one clinical note.
///
/// Everything is request-scoped; the processor itself holds only the shared
/// client and is safe to use from concurrent requests.
pub struct NoteProcessor {
    llm: ResilientLlmClient
}

impl NoteProcessor {
    pub fn new(llm: ResilientLlmClient) -> Self {
        Self { llm }
    }

    /// Process one note: summarize, extract, validate, assemble.
    ///
    /// The two LLM calls share no state and run concurrently; failure in
    /// either aborts the whole request and no partial response is returned.
    pub async fn process(&self, request: &NoteRequest) -> Result<NoteResponse, ProcessError> {
        check_request(request)?;

        let request_id = Uuid::new_v4().to_string();
        let span = info_span!(
            "process_note",
            request_id = %request_id,
            patient_id = %request.patient_id,
            note_chars = request.clinical_note.len()
        );

        async move {
            let summary = async {
                let reply = self
                    .llm
                    .call(TaskKind::Summarize, &request.clinical_note)
                    .await?;
                Ok::<_, ProcessError>(reply.trim().to_string())
            };

            let entities = async {
                let reply = self
                    .llm
                    .call(TaskKind::Extract, &request.clinical_note)
                    .await?;
                validate_entities(extract_json(&reply)?)
            };

            let (summary, entities) = tokio::try_join!(summary, entities)?;

            let entity_count = entities.medications.len()
                + entities.diagnoses.len()
                + entities.procedures.len()
                + entities.allergies.len();
            tracing::info!(entity_count, summary_chars = summary.len(), "Note processed");

            Ok(NoteResponse {
                request_id,
                patient_id: request.patient_id.clone(),
                visit_id: request.visit_id.clone(),
                summary,
                entities,
                processed_at: Utc::now()
            })
        }
        .instrument(span)
        .await
    }
}

/// Shape guard mirroring the HTTP layer's validator pass, so the core is
/// safe when driven directly.
fn check_request(request: &NoteRequest) -> Result<(), ProcessError> {
    if request.clinical_note.trim().is_empty() {
        return Err(ProcessError::InvalidRequest {
            field: "clinical_note".to_string(),
            reason: "must not be blank".to_string()
        });
    }
    if request.clinical_note.chars().count() < 10 {
        return Err(ProcessError::InvalidRequest {
            field: "clinical_note".to_string(),
            reason: "must be at least 10 characters".to_string()
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(note: &str) -> NoteRequest {
        NoteRequest {
            clinical_note: note.to_string(),
            patient_id: "P1".to_string(),
            visit_id: None
        }
    }

    #[test]
    fn test_check_request_rejects_blank() {
        let err = check_request(&request("     \n    ")).unwrap_err();
        assert!(matches!(err, ProcessError::InvalidRequest { ref field, .. } if field == "clinical_note"));
    }

    #[test]
    fn test_check_request_rejects_short() {
        assert!(check_request(&request("short")).is_err());
        assert!(check_request(&request("long enough note")).is_ok());
    }

    #[test]
    fn test_check_request_counts_characters_not_bytes() {
        // Nine accented characters, eighteen bytes.
        assert!(check_request(&request("ééééééééé")).is_err());
        assert!(check_request(&request("éééééééééé")).is_ok());
    }
}
