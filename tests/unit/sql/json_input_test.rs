// JSON input contract: malformed documents are shape errors, never rendered

use crate::unit::common::{column, compile, literal, stream_from};

fn assert_shape(json: &str, fragment: &str) {
    let err = compile(json).unwrap_err();
    assert!(err.is_shape(), "expected shape error, got {:?}", err);
    assert!(
        err.to_string().contains(fragment),
        "'{}' does not mention '{}'",
        err,
        fragment
    );
}

#[test]
fn test_unknown_statement_type() {
    assert_shape(r#"{"type":"UPSERT","sourceName":"s"}"#, "UPSERT");
}

#[test]
fn test_unknown_scalar_type_names_allowed_set() {
    let json = format!(
        r#"{{"type":"COLUMN","columns":[{{"expression":{{"type":"TRANSFORMATION","value":
            {{"type":"CAST","targetType":"VARCHAR","sourceExpression":{}}}}}}}],"from":{}}}"#,
        column("id"),
        stream_from("s")
    );
    assert_shape(&json, "VARCHAR");
}

#[test]
fn test_operator_operand_mismatch() {
    let json = format!(
        r#"{{"type":"STAR","from":{},
            "where":{{"type":"COMPARISON","operator":"BETWEEN","left":{},"right":{}}}}}"#,
        stream_from("s"),
        column("a"),
        literal("1")
    );
    assert_shape(&json, "BETWEEN requires start and end operands");

    let json = format!(
        r#"{{"type":"STAR","from":{},
            "where":{{"type":"COMPARISON","operator":"IN","left":{},"right":{}}}}}"#,
        stream_from("s"),
        column("a"),
        literal("1")
    );
    assert_shape(&json, "IN requires a list of right operands");
}

#[test]
fn test_partition_by_without_group_by() {
    let json = format!(
        r#"{{"type":"COLUMN","columns":[{{"expression":{}}}],"from":{},
            "partitionBy":{{"columns":[{}]}}}}"#,
        column("a"),
        stream_from("s"),
        column("a")
    );
    assert_shape(&json, "partitionBy requires a groupBy");
}

#[test]
fn test_missing_required_field() {
    assert_shape(r#"{"type":"STAR"}"#, "from");
}

#[test]
fn test_where_not_requires_single_condition() {
    let json = format!(
        r#"{{"type":"STAR","from":{},"where":{{"type":"LOGICAL","operator":"NOT","conditions":[]}}}}"#,
        stream_from("s")
    );
    assert_shape(&json, "NOT requires a single `condition` operand");
}

#[test]
fn test_having_aggregate_null_check_is_rejected() {
    let json = format!(
        r#"{{"type":"COLUMN","columns":[{{"expression":{}}}],"from":{},
            "groupBy":{{"columns":[{{"expression":{}}}],
                "having":{{"type":"AGGREGATE","function":"MAX","parameters":[{}],"operator":"IS NULL"}}}}}}"#,
        column("a"),
        stream_from("s"),
        column("a"),
        column("b")
    );
    assert_shape(&json, "IS NULL is not supported for aggregate HAVING conditions");
}

#[test]
fn test_validate_json_matches_compile_json() {
    let valid = format!(r#"{{"type":"STAR","from":{}}}"#, stream_from("s"));
    assert!(ksqlgen::validate_json(&valid).is_ok());

    let invalid = format!(r#"{{"type":"STAR","from":{}}}"#, stream_from("bad name"));
    assert_eq!(
        ksqlgen::validate_json(&invalid).unwrap_err(),
        compile(&invalid).unwrap_err()
    );
}

#[test]
fn test_source_options_reject_unknown_keys() {
    let json = r#"{"type":"STAR","from":{"sourceType":"STREAM",
        "source":{"type":"DIRECT","name":"s","sourceType":"STREAM"},
        "sourceOptions":{"retention":{"time":{"value":1,"unit":"DAYS"}},"retentionMs":5}}}"#;
    assert_shape(json, "unknown field `retentionMs`");
}

#[test]
fn test_source_storage_options_are_accepted() {
    let json = r#"{"type":"STAR","from":{"sourceType":"STREAM",
        "source":{"type":"DIRECT","name":"s","sourceType":"STREAM"},
        "sourceOptions":{"format":{"valueFormat":"AVRO"},"retention":{"size":100},
            "topicName":"s_topic","emitChanges":true,"replicas":2}},
        "emit":"CHANGES"}"#;
    assert_eq!(compile(json).unwrap(), "SELECT * FROM s EMIT CHANGES;");
}
