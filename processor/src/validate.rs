//! Mapping of untrusted decoded JSON into the strict entity schema.

use cn_core::types::{DiagnosisEntity, ExtractedEntities, MedicationEntity, ProcedureEntity};
use errors::ProcessError;
use serde_json::Value;

/// Build [`ExtractedEntities`] from an arbitrary decoded JSON value.
///
/// Absent collections default to empty; present collections are validated
/// element by element, and a failing element names its `key[index]` path.
/// Unknown extra fields inside elements are ignored. `vitals` is free-form:
/// an object passes through untouched, anything else becomes an empty map.
pub fn validate_entities(raw: Value) -> Result<ExtractedEntities, ProcessError> {
    let Value::Object(mut map) = raw else {
        return Err(ProcessError::SchemaValidationFailed {
            field: "$".to_string(),
            reason: "expected a JSON object".to_string()
        });
    };

    Ok(ExtractedEntities {
        medications: collection::<MedicationEntity>(&mut map, "medications")?,
        diagnoses: collection::<DiagnosisEntity>(&mut map, "diagnoses")?,
        procedures: collection::<ProcedureEntity>(&mut map, "procedures")?,
        allergies: collection::<String>(&mut map, "allergies")?,
        vitals: match map.remove("vitals") {
            Some(Value::Object(vitals)) => vitals,
            _ => serde_json::Map::new()
        }
    })
}

fn collection<T: serde::de::DeserializeOwned>(
    map: &mut serde_json::Map<String, Value>,
    key: &str
) -> Result<Vec<T>, ProcessError> {
    let Some(value) = map.remove(key) else {
        return Ok(Vec::new());
    };

    let Value::Array(items) = value else {
        return Err(ProcessError::SchemaValidationFailed {
            field: key.to_string(),
            reason: "expected an array".to_string()
        });
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|e| ProcessError::SchemaValidationFailed {
                field: format!("{key}[{index}]"),
                reason: e.to_string()
            })
        })
        .collect()
}
