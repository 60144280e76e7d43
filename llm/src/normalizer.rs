//! Recovery of a JSON object from a prose-contaminated model reply.

use errors::ProcessError;

/// Extract a single JSON value from raw model output.
///
/// The model sometimes wraps its JSON in explanatory prose. The whole text
/// is tried first; failing that, the substring from the first `{` to the
/// last `}` (inclusive) is parsed.
///
/// Known limitation: the bounding is positional, not bracket-matched. A
/// valid JSON object followed by unrelated prose that itself contains a `}`
/// selects a wider, invalid substring. That adversarial shape is accepted as
/// a failure mode rather than worked around, because downstream behavior is
/// calibrated against it.
pub fn extract_json(raw_text: &str) -> Result<serde_json::Value, ProcessError> {
    if let Ok(value) = serde_json::from_str(raw_text) {
        return Ok(value);
    }

    let start = raw_text.find('{');
    let end = raw_text.rfind('}');

    match (start, end) {
        (Some(start), Some(end)) if start < end => {
            serde_json::from_str(&raw_text[start..=end]).map_err(|e| ProcessError::MalformedJson {
                reason: e.to_string()
            })
        }
        _ => Err(ProcessError::NoJsonFound)
    }
}
