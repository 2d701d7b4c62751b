//! Tests for claims-model types.

use claims_model::{
    FieldMapping, FieldUsage, MappingConfig, MappingMode, SuggestionEntry, SuggestionSet,
    TargetField, TargetLayout, ValueType,
};

#[test]
fn mapping_config_round_trips_through_json() {
    let config = MappingConfig {
        layout_name: "standard".to_string(),
        source_name: "claims_jan".to_string(),
        mappings: vec![
            FieldMapping {
                target_field: "NPI".to_string(),
                source_column: "PROV_NPI".to_string(),
                confidence_percent: Some(112.5),
                mode: MappingMode::Algorithmic,
            },
            FieldMapping {
                target_field: "Member ID".to_string(),
                source_column: "MBR".to_string(),
                confidence_percent: None,
                mode: MappingMode::Manual,
            },
        ],
        unmapped_fields: vec!["Claim Amount".to_string()],
    };
    let json = serde_json::to_string(&config).expect("serialize config");
    let round: MappingConfig = serde_json::from_str(&json).expect("deserialize config");
    assert_eq!(round, config);
    assert_eq!(round.manual_count(), 1);
    assert_eq!(
        round.mapping_for("NPI").map(|m| m.source_column.as_str()),
        Some("PROV_NPI")
    );
}

#[test]
fn layout_lookup_prefers_last_duplicate() {
    let layout = TargetLayout::new(vec![
        TargetField::new("Zip", "").with_usage(FieldUsage::Optional),
        TargetField::new("Zip", "").with_usage(FieldUsage::Mandatory),
    ]);
    let field = layout.field("Zip").expect("field present");
    assert_eq!(field.usage, FieldUsage::Mandatory);
    assert_eq!(field.expected_type, ValueType::Numeric);
}

#[test]
fn suggestion_set_iterates_in_field_order() {
    let set: SuggestionSet = [
        SuggestionEntry::new("Zip", "ZIP5", 0.9),
        SuggestionEntry::new("NPI", "NPI", 1.25),
    ]
    .into_iter()
    .collect();
    let fields: Vec<&str> = set.iter().map(|e| e.target_field.as_str()).collect();
    assert_eq!(fields, vec!["NPI", "Zip"]);
}
