#[cfg(test)]
mod tests {
    use gymshot_core::*;
    use serde_json::json;

    // ── Payload tests ──────────────────────────────────────────

    #[test]
    fn test_raw_payload_shape() {
        let payload = WebhookPayload::raw("not json at all");
        assert!(payload.is_raw());
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({ "raw_content": "not json at all" })
        );
        assert_eq!(payload.to_json(), json!({ "raw_content": "not json at all" }));
    }

    #[test]
    fn test_record_payload_serializes_transparently() {
        let value = json!({ "name": "Przysiad", "extra": 1 });
        let payload = WebhookPayload::Record(value.clone());
        assert!(!payload.is_raw());
        assert_eq!(serde_json::to_value(&payload).unwrap(), value);
    }

    // ── Error tests ────────────────────────────────────────────

    #[test]
    fn test_error_display() {
        let err = GymshotError::VisionProvider("HTTP 502: bad gateway".into());
        assert!(err.to_string().contains("HTTP 502"));

        let err = GymshotError::MissingCredential;
        assert!(err.to_string().contains("OPENROUTER_API_KEY"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: GymshotError = io.into();
        assert!(matches!(err, GymshotError::Io(_)));
    }

    // ── Record tests ───────────────────────────────────────────

    #[test]
    fn test_record_defaults_owner_id() {
        let record: ExerciseRecord =
            serde_json::from_value(json!({ "name": "Deska", "type": "duration" })).unwrap();
        assert_eq!(record.owner_id, "public");
        assert!(record.main_muscle_groups.is_empty());
        assert_eq!(record.exercise_type, ExerciseType::Duration);
    }

    #[test]
    fn test_conformance_flags_foreign_owner() {
        let issues = ExerciseRecord::conformance_issues(&json!({
            "name": "Pompki",
            "ownerId": "someone",
            "type": "reps"
        }));
        assert_eq!(issues.len(), 1);
        assert!(issues[0].contains("someone"));
    }

    #[test]
    fn test_conformance_rejects_non_object() {
        let issues = ExerciseRecord::conformance_issues(&json!([1, 2, 3]));
        assert_eq!(issues, vec!["payload is not a JSON object".to_string()]);
    }
}
