//! Turns the model's text reply into the webhook payload.
//!
//! Two stages: [`extract_json`] finds and parses the JSON (fenced or not),
//! then [`translate`] renames muscle groups on the parsed object.

use gymshot_core::{ExerciseRecord, WebhookPayload};
use serde_json::{Map, Value};

use crate::mapping::{MappingOutcome, MuscleGroupTable};

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Top-level fields holding muscle-group lists.
pub const MUSCLE_GROUP_FIELDS: [&str; 2] = ["mainMuscleGroups", "secondaryMuscleGroups"];

/// Result of the extraction stage.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// Parsed from the interior of a fenced block.
    Wrapped(Value),
    /// The whole reply parsed as JSON.
    Unwrapped(Value),
    /// Not JSON; carries the original reply.
    Unparseable(String),
}

impl Extraction {
    pub fn kind(&self) -> &'static str {
        match self {
            Extraction::Wrapped(_) => "wrapped",
            Extraction::Unwrapped(_) => "unwrapped",
            Extraction::Unparseable(_) => "unparseable",
        }
    }
}

/// Output of [`translate`].
#[derive(Debug, Clone)]
pub struct Translation {
    pub payload: WebhookPayload,
    /// "wrapped", "unwrapped" or "unparseable".
    pub extraction: &'static str,
    /// Names that were renamed.
    pub notes: Vec<String>,
    /// Names that had no mapping, and groups of the wrong type.
    pub warnings: Vec<String>,
    /// Ways the record departs from the requested JSON contract.
    pub contract_issues: Vec<String>,
}

/// Interior of the first fenced block, preferring a ```` ```json ```` fence.
///
/// The interior runs to the next fence, or to the end of the text when the
/// block is never closed.
pub fn fenced_interior(text: &str) -> Option<&str> {
    let start = match text.find(JSON_FENCE) {
        Some(pos) => pos + JSON_FENCE.len(),
        None => text.find(FENCE)? + FENCE.len(),
    };
    let rest = &text[start..];
    let end = rest.find(FENCE).unwrap_or(rest.len());
    Some(rest[..end].trim())
}

/// Stage one: locate the JSON and parse it.
pub fn extract_json(text: &str) -> Extraction {
    match fenced_interior(text) {
        Some(inner) => match serde_json::from_str(inner) {
            Ok(value) => Extraction::Wrapped(value),
            Err(_) => Extraction::Unparseable(text.to_string()),
        },
        None => match serde_json::from_str(text) {
            Ok(value) => Extraction::Unwrapped(value),
            Err(_) => Extraction::Unparseable(text.to_string()),
        },
    }
}

/// Stage two: produce the payload, renaming muscle groups through `table`.
pub fn translate(text: &str, table: &MuscleGroupTable) -> Translation {
    let extraction = extract_json(text);
    let kind = extraction.kind();

    let mut value = match extraction {
        Extraction::Wrapped(value) | Extraction::Unwrapped(value) => value,
        Extraction::Unparseable(raw) => {
            return Translation {
                payload: WebhookPayload::raw(raw),
                extraction: kind,
                notes: vec![],
                warnings: vec![],
                contract_issues: vec![],
            };
        }
    };

    let mut notes = Vec::new();
    let mut warnings = Vec::new();
    if let Value::Object(ref mut object) = value {
        for field in MUSCLE_GROUP_FIELDS {
            remap_field(object, field, table, &mut notes, &mut warnings);
        }
    }

    let contract_issues = ExerciseRecord::conformance_issues(&value);
    Translation {
        payload: WebhookPayload::Record(value),
        extraction: kind,
        notes,
        warnings,
        contract_issues,
    }
}

fn remap_field(
    object: &mut Map<String, Value>,
    field: &str,
    table: &MuscleGroupTable,
    notes: &mut Vec<String>,
    warnings: &mut Vec<String>,
) {
    let Some(groups) = object.get_mut(field) else {
        return;
    };

    let entries = match groups {
        Value::Null => Vec::new(),
        Value::Array(entries) => std::mem::take(entries),
        other => {
            warnings.push(format!("{field}: expected a list, found {other}; left as-is"));
            return;
        }
    };

    let remapped = entries
        .iter()
        .map(|entry| {
            let name = entry.get("name").and_then(Value::as_str).unwrap_or("");
            let image_url = entry.get("imageUrl").cloned().unwrap_or(Value::Null);
            let outcome = table.resolve(name);
            match &outcome {
                MappingOutcome::Mapped { from, to } => {
                    notes.push(format!("{field}: mapped '{from}' -> '{to}'"));
                }
                MappingOutcome::Unmapped(name) => {
                    warnings.push(format!("{field}: no mapping found for '{name}', using as-is"));
                }
                MappingOutcome::Unchanged(_) => {}
            }
            serde_json::json!({
                "name": outcome.name(),
                "imageUrl": image_url,
            })
        })
        .collect();

    *groups = Value::Array(remapped);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fenced_interior_variants() {
        assert_eq!(fenced_interior("```json\n{\"a\":1}\n```"), Some("{\"a\":1}"));
        assert_eq!(fenced_interior("text ```\n[1]\n``` more"), Some("[1]"));
        assert_eq!(fenced_interior("```json\n{\"open\":true}"), Some("{\"open\":true}"));
        assert_eq!(fenced_interior("{\"plain\":true}"), None);
    }

    #[test]
    fn test_json_fence_preferred_over_earlier_plain_fence() {
        let text = "```\nnot this\n```\n```json\n{\"a\":2}\n```";
        assert_eq!(fenced_interior(text), Some("{\"a\":2}"));
    }

    #[test]
    fn test_extraction_tags() {
        assert!(matches!(extract_json("```json\n{}\n```"), Extraction::Wrapped(_)));
        assert!(matches!(extract_json(" {} "), Extraction::Unwrapped(_)));
        assert_eq!(
            extract_json("```json\n{oops\n```"),
            Extraction::Unparseable("```json\n{oops\n```".into())
        );
    }
}
