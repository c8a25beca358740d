// Compile errors: fail-closed behavior and aggregated diagnostics

use crate::unit::common::{column, compile, stream_from};
use ksqlgen::ksql::sql::ast::{
    CastItem, DataType, SessionWindow, StructField, WindowDuration, WindowSpec, WindowTimeUnit,
};
use ksqlgen::ksql::sql::compiler::{CastCompiler, SqlBuilder, WindowCompiler};
use ksqlgen::CompileError;

#[test]
fn test_empty_struct_fails_to_build() {
    let empty = CastItem::Struct(vec![]);
    let err = CastCompiler::validate(&empty).unwrap_err();
    assert_eq!(err.to_string(), "Struct must have at least one field");
    assert!(CastCompiler::build(&empty).is_err());
}

#[test]
fn test_session_window_with_retention_fails() {
    let mut window = SessionWindow::new(WindowDuration::new(30, WindowTimeUnit::Minutes));
    window.retention = Some(WindowDuration::new(1, WindowTimeUnit::Hours));
    let spec = WindowSpec::Session(window);
    assert!(WindowCompiler::validate(&spec).is_err());
    assert!(WindowCompiler::build(&spec).is_err());
}

#[test]
fn test_struct_collects_every_bad_field() {
    let item = CastItem::Struct(vec![
        StructField::new("ok", DataType::Integer.into()),
        StructField::new("bad name", DataType::String.into()),
        StructField::new("nested", CastItem::Struct(vec![])),
    ]);
    let err = CastCompiler::validate(&item).unwrap_err();
    assert_eq!(
        err.messages(),
        vec![
            "Invalid struct field name: 'bad name'".to_string(),
            "Struct must have at least one field".to_string(),
        ]
    );
    assert!(err.to_string().starts_with("Invalid struct type: "));
}

#[test]
fn test_every_invalid_select_column_is_reported() {
    let json = format!(
        r#"{{"type":"COLUMN","columns":[
            {{"expression":{}}},
            {{"expression":{},"alias":"bad alias"}},
            {{"expression":{{"type":"COLUMN","sourceColumn":""}}}}
        ],"from":{}}}"#,
        column("ok"),
        column("also_ok"),
        stream_from("s")
    );
    let err = compile(&json).unwrap_err();
    assert!(matches!(err, CompileError::Aggregate { .. }));
    assert_eq!(
        err.to_string(),
        "Invalid select column: Invalid alias: 'bad alias', Column name is required"
    );
}

#[test]
fn test_invalid_window_in_group_by() {
    let json = format!(
        r#"{{"type":"COLUMN","columns":[{{"expression":{region}}}],"from":{from},
            "groupBy":{{"columns":[{{"expression":{region}}}],
                "window":{{"spec":{{"type":"HOPPING","size":{{"value":0,"unit":"MINUTES"}},"advance":{{"value":5,"unit":"MINUTES"}}}}}}}}}}"#,
        region = column("region"),
        from = stream_from("s"),
    );
    let err = compile(&json).unwrap_err();
    assert!(err.to_string().starts_with("Invalid group by window: "), "{}", err);
    assert!(err.to_string().contains("Invalid window duration: 0 MINUTES"), "{}", err);
}
