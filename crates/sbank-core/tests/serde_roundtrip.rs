use sbank_core::provenance::{RunProvenance, SchemaVersion};

#[test]
fn provenance_round_trip_json() {
    let provenance = RunProvenance {
        config_hash: "config".into(),
        bank_hash: "bank".into(),
        seed: 42,
        created_at: "2024-01-01T00:00:00Z".into(),
        finished_at: "2024-01-01T00:00:05Z".into(),
        tool_versions: [("sbank-core".into(), "0.1.0".into())]
            .into_iter()
            .collect(),
    };

    let json = serde_json::to_string_pretty(&provenance).expect("serialize");
    let decoded: RunProvenance = serde_json::from_str(&json).expect("deserialize");

    assert_eq!(decoded, provenance);
}

#[test]
fn schema_compatibility_follows_major_version() {
    let reader = SchemaVersion::new(1, 2, 0);
    assert!(reader.accepts(&SchemaVersion::new(1, 0, 3)));
    assert!(!reader.accepts(&SchemaVersion::new(2, 0, 0)));
    assert!(!reader.accepts(&SchemaVersion::new(1, 3, 0)));
}
