//! Fixed system instructions for each LLM task.

use cn_core::TaskKind;

pub const SUMMARIZE_SYSTEM: &str = "Summarize this clinical note like a medical professional \
                                    would.\nInclude the most important info:\n- Patient \
                                    details\n- Key diagnoses\n- Major findings\n- What the \
                                    treatment plan is\n- Follow-up plan\n\nKeep it focused on \
                                    medical details. Skip the administrative stuff.";

pub const EXTRACT_SYSTEM: &str = "Extract the key medical info from this clinical note as \
                                  structured data.\nI need:\n- Medications (with \
                                  dosage/frequency/route when available)\n- Diagnoses (with \
                                  status if mentioned)\n- Procedures (with dates if \
                                  mentioned)\n- Allergies\n- Vital signs\n\nReturn as JSON that \
                                  looks like:\n{\n    \"medications\": [{\"name\": \"med \
                                  name\", \"dosage\": \"dose\", \"frequency\": \"how often\", \
                                  \"route\": \"how given\"}],\n    \"diagnoses\": \
                                  [{\"condition\": \"diagnosis\", \"status\": \"current \
                                  status\", \"certainty\": \"confirmed/suspected\"}],\n    \
                                  \"procedures\": [{\"name\": \"procedure name\", \"date\": \
                                  \"when done\", \"status\": \"completed/planned\"}],\n    \
                                  \"allergies\": [\"allergy1\", \"allergy2\"],\n    \"vitals\": \
                                  {\"temp\": \"value\", \"bp\": \"value\", \"hr\": \
                                  \"value\"}\n}\n\nOnly include fields that actually appear in \
                                  the note.";

pub fn system_for(task: TaskKind) -> &'static str {
    match task {
        TaskKind::Summarize => SUMMARIZE_SYSTEM,
        TaskKind::Extract => EXTRACT_SYSTEM
    }
}

pub fn user_for(task: TaskKind, clinical_note: &str) -> String {
    match task {
        TaskKind::Summarize => format!("Summarize this note: {clinical_note}"),
        TaskKind::Extract => format!("Extract structured data from: {clinical_note}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_prompt_embeds_note() {
        let user = user_for(TaskKind::Extract, "BP 140/90");
        assert!(user.starts_with("Extract structured data from:"));
        assert!(user.contains("BP 140/90"));
    }

    #[test]
    fn test_extract_system_describes_all_collections() {
        for key in ["medications", "diagnoses", "procedures", "allergies", "vitals"] {
            assert!(EXTRACT_SYSTEM.contains(key), "missing {key}");
        }
    }
}
