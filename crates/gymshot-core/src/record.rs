use serde::{Deserialize, Serialize};

/// Owner id the prompt asks the model to emit for every record.
pub const PUBLIC_OWNER_ID: &str = "public";

/// The structured exercise description extracted from a batch of screenshots.
///
/// Field names follow the JSON contract given to the model (camelCase).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseRecord {
    pub name: String,
    #[serde(default)]
    pub main_muscle_groups: Vec<MuscleGroup>,
    #[serde(default)]
    pub secondary_muscle_groups: Vec<MuscleGroup>,
    #[serde(default)]
    pub setup: Vec<SetupEntry>,
    #[serde(default = "default_owner_id")]
    pub owner_id: String,
    #[serde(default)]
    pub instructions: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub exercise_type: ExerciseType,
}

/// A muscle group entry. `imageUrl` is serialized as `null` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MuscleGroup {
    pub name: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// One `{group, value}` pair of the exercise setup (grip, position, equipment…).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupEntry {
    pub group: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseType {
    Weight,
    Duration,
    Reps,
}

impl ExerciseRecord {
    /// Check whether a JSON value conforms to the record contract.
    ///
    /// Returns the list of problems found; an empty list means the value
    /// deserializes cleanly and carries the expected owner id.
    pub fn conformance_issues(value: &serde_json::Value) -> Vec<String> {
        if !value.is_object() {
            return vec!["payload is not a JSON object".into()];
        }
        match serde_json::from_value::<ExerciseRecord>(value.clone()) {
            Ok(record) if record.owner_id != PUBLIC_OWNER_ID => {
                vec![format!("ownerId is '{}', expected '{PUBLIC_OWNER_ID}'", record.owner_id)]
            }
            Ok(_) => vec![],
            Err(e) => vec![e.to_string()],
        }
    }
}

impl MuscleGroup {
    pub fn new(name: impl Into<String>, image_url: Option<String>) -> Self {
        Self {
            name: name.into(),
            image_url,
        }
    }
}

fn default_owner_id() -> String {
    PUBLIC_OWNER_ID.into()
}
