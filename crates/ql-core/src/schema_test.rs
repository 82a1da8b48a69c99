use super::*;
use crate::types::ColumnKind;

fn make_meta(ty_name: &str, kind: ColumnKind, display: &str) -> ColumnMetadata {
    ColumnMetadata::new(ColumnType::new(ty_name, kind), display)
}

fn two_col_schema() -> Schema {
    Schema::new(vec![
        (
            "id".to_string(),
            make_meta("INTEGER", ColumnKind::Integer, "id"),
        ),
        (
            "name".to_string(),
            make_meta("TEXT", ColumnKind::String, "Name"),
        ),
    ])
}

#[test]
fn test_lookup() {
    let schema = two_col_schema();
    assert_eq!(schema.len(), 2);
    assert!(schema.contains("id"));
    assert!(!schema.contains("missing"));
    assert_eq!(schema.column_index("name"), Some(1));
    assert_eq!(schema.display_name("name"), Some("Name"));
    assert_eq!(
        schema.column_type("id").map(|t| t.kind),
        Some(ColumnKind::Integer)
    );
}

#[test]
fn test_extend_appends() {
    let schema = two_col_schema();
    let extended = schema
        .extend("score", make_meta("REAL", ColumnKind::Real, "score"))
        .expect("extend failed");
    assert_eq!(extended.columns, vec!["id", "name", "score"]);
    // Original is untouched
    assert_eq!(schema.len(), 2);
}

#[test]
fn test_extend_duplicate_fails() {
    let schema = two_col_schema();
    let err = schema
        .extend("id", make_meta("INTEGER", ColumnKind::Integer, "id"))
        .unwrap_err();
    assert!(err.to_string().contains("Duplicate column 'id'"));
}

#[test]
fn test_compatible_ignores_display_names() {
    let a = two_col_schema();
    let b = Schema::new(vec![
        (
            "id".to_string(),
            make_meta("INTEGER", ColumnKind::Integer, "Identifier"),
        ),
        (
            "name".to_string(),
            make_meta("TEXT", ColumnKind::String, "name"),
        ),
    ]);
    assert!(a.compatible_with(&b));
}

#[test]
fn test_compatible_rejects_type_change() {
    let a = two_col_schema();
    let b = Schema::new(vec![
        (
            "id".to_string(),
            make_meta("TEXT", ColumnKind::String, "id"),
        ),
        (
            "name".to_string(),
            make_meta("TEXT", ColumnKind::String, "Name"),
        ),
    ]);
    assert!(!a.compatible_with(&b));
}

#[test]
fn test_compatible_rejects_reorder() {
    let a = two_col_schema();
    let b = Schema::new(vec![
        (
            "name".to_string(),
            make_meta("TEXT", ColumnKind::String, "Name"),
        ),
        (
            "id".to_string(),
            make_meta("INTEGER", ColumnKind::Integer, "id"),
        ),
    ]);
    assert!(!a.compatible_with(&b));
}

#[test]
fn test_schema_wire_shape() {
    let schema = two_col_schema();
    let json = serde_json::to_value(&schema).unwrap();
    assert!(json.get("columns").is_some());
    assert!(json.get("columnMetadata").is_some());
    let meta = &json["columnMetadata"]["name"];
    assert_eq!(meta["displayName"], "Name");
    assert_eq!(meta["type"]["sqlTypeName"], "TEXT");
}
