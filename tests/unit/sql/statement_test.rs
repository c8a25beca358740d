// DDL, DML and administrative statements compiled from JSON

use crate::unit::common::{column, compile, decode, stream_from};

#[test]
fn test_insert_values_doubles_quotes() {
    let json = r#"{"type":"INSERT","statement":{"type":"VALUES",
        "target":{"name":"t"},
        "data":[{"column":"x","value":{"value":"a'b"}}]}}"#;
    assert_eq!(compile(json).unwrap(), "INSERT INTO t (x) VALUES ('a''b');");
}

#[test]
fn test_insert_values_with_matching_target_columns() {
    let json = r#"{"type":"INSERT","statement":{"type":"VALUES",
        "target":{"name":"readings","columns":["id","temp","ok","note"]},
        "schema":{"fields":[{"name":"id","type":"BIGINT","required":true},{"name":"temp","type":"DOUBLE"}]},
        "data":[
            {"column":"id","value":{"value":7}},
            {"column":"temp","value":{"value":21.5}},
            {"column":"ok","value":{"value":true}},
            {"column":"note","value":{"value":null}}
        ]}}"#;
    assert_eq!(
        compile(json).unwrap(),
        "INSERT INTO readings (id, temp, ok, note) VALUES (7, 21.5, true, NULL);"
    );
}

#[test]
fn test_insert_values_rejects_mismatched_target_columns() {
    let json = r#"{"type":"INSERT","statement":{"type":"VALUES",
        "target":{"name":"t","columns":["a","b"]},
        "data":[{"column":"b","value":{"value":1}},{"column":"a","value":{"value":2}}]}}"#;
    assert_eq!(
        compile(json).unwrap_err().to_string(),
        "Target columns (a, b) do not match inserted columns (b, a)"
    );
}

#[test]
fn test_insert_select_embeds_query_without_terminator() {
    let json = format!(
        r#"{{"type":"INSERT","statement":{{"type":"SELECT",
            "target":{{"name":"archive"}},
            "data":{{"type":"STAR","from":{},"emit":"CHANGES"}}}}}}"#,
        stream_from("orders")
    );
    assert_eq!(
        compile(&json).unwrap(),
        "INSERT INTO archive SELECT * FROM orders EMIT CHANGES;"
    );
}

#[test]
fn test_create_stream_with_composite_types() {
    let json = r#"{"type":"CREATE","createType":"SOURCE","sourceType":"STREAM","sourceName":"events",
        "schema":[
            {"name":"id","type":"STRING","key":true},
            {"name":"tags","type":{"type":"ARRAY","elementType":"STRING"}},
            {"name":"attrs","type":{"type":"MAP","valueType":"INTEGER"}},
            {"name":"geo","type":{"type":"STRUCT","fields":[{"name":"lat","type":"DOUBLE"},{"name":"lon","type":"DOUBLE"}]}}
        ],
        "options":{"format":{"keyFormat":"KAFKA","valueFormat":"JSON"},"kafkaTopic":"events","partitions":6,"replicas":3,
            "timestampColumn":{"name":"ts","format":"yyyy-MM-dd HH:mm:ss"}}}"#;
    assert_eq!(
        compile(json).unwrap(),
        "CREATE STREAM events (id STRING KEY, tags ARRAY<STRING>, attrs MAP<STRING, INTEGER>, \
         geo STRUCT<lat DOUBLE, lon DOUBLE>) WITH (VALUE_FORMAT='JSON', KEY_FORMAT='KAFKA', \
         KAFKA_TOPIC='events', PARTITIONS=6, REPLICAS=3, TIMESTAMP='ts', \
         TIMESTAMP_FORMAT='yyyy-MM-dd HH:mm:ss');"
    );
}

#[test]
fn test_create_table_as_select() {
    let json = format!(
        r#"{{"type":"CREATE","createType":"AS_SELECT","sourceType":"TABLE","sourceName":"totals",
            "ifNotExists":true,
            "select":{{"type":"COLUMN",
                "columns":[{{"expression":{user}}},{{"expression":{{"type":"TRANSFORMATION",
                    "value":{{"type":"AGGREGATE","function":"COUNT","alias":"n"}}}}}}],
                "from":{from},
                "groupBy":{{"columns":[{{"expression":{user}}}]}},
                "emit":"CHANGES"}},
            "options":{{"format":{{"valueFormat":"AVRO"}},"kafkaTopic":"totals"}}}}"#,
        user = column("user_id"),
        from = stream_from("clicks"),
    );
    assert_eq!(
        compile(&json).unwrap(),
        "CREATE IF NOT EXISTS TABLE totals WITH (VALUE_FORMAT='AVRO', KAFKA_TOPIC='totals') AS \
         SELECT user_id, COUNT(*) AS n FROM clicks GROUP BY user_id EMIT CHANGES;"
    );
}

#[test]
fn test_create_reports_every_bad_option() {
    let json = r#"{"type":"CREATE","createType":"SOURCE","sourceType":"STREAM","sourceName":"s",
        "schema":[{"name":"id","type":"BIGINT"}],
        "options":{"format":{"valueFormat":"JSON"},"partitions":0,"stateStoreName":"store"}}"#;
    assert_eq!(
        compile(json).unwrap_err().to_string(),
        "Invalid options: Invalid partitions: 0, STATE_STORE_NAME is only supported for TABLE sources"
    );
}

#[test]
fn test_drop_terminate_and_properties() {
    assert_eq!(
        compile(r#"{"type":"DROP","sourceType":"STREAM","sourceName":"s","options":{"ifExists":true}}"#)
            .unwrap(),
        "DROP STREAM IF EXISTS s;"
    );
    assert_eq!(
        compile(r#"{"type":"TERMINATE","queryId":"CTAS_TOTALS_3"}"#).unwrap(),
        "TERMINATE CTAS_TOTALS_3;"
    );
    assert_eq!(
        compile(r#"{"type":"PROPERTY","action":"SET","property":"ksql.streams.cache.max.bytes.buffering","value":"0"}"#)
            .unwrap(),
        "SET 'ksql.streams.cache.max.bytes.buffering'='0';"
    );
    assert_eq!(
        compile(r#"{"type":"PROPERTY","action":"SHOW","property":"auto.offset.reset","value":"x"}"#)
            .unwrap_err()
            .to_string(),
        "SHOW action does not require a value"
    );
}

#[test]
fn test_terminate_rejects_injection() {
    assert_eq!(
        compile(r#"{"type":"TERMINATE","queryId":"Q1; DROP STREAM s"}"#)
            .unwrap_err()
            .to_string(),
        "Invalid query ID"
    );
}

#[test]
fn test_list_show_describe() {
    assert_eq!(
        compile(r#"{"type":"LIST","sourceType":"STREAM","extended":true}"#).unwrap(),
        "LIST STREAMS EXTENDED;"
    );
    assert_eq!(
        compile(r#"{"type":"SHOW","showType":"TOPICS"}"#).unwrap(),
        "SHOW TOPICS;"
    );
    assert_eq!(
        compile(r#"{"type":"DESCRIBE","target":{"type":"TABLE","name":"app.users"}}"#).unwrap(),
        "DESCRIBE app.users;"
    );
}

#[test]
fn test_explain_create_as_select() {
    let json = format!(
        r#"{{"type":"EXPLAIN","statement":{{"type":"CREATE","createType":"AS_SELECT",
            "sourceType":"STREAM","sourceName":"copy",
            "select":{{"type":"STAR","from":{}}},
            "options":{{"format":{{"valueFormat":"JSON"}}}}}}}}"#,
        stream_from("orders")
    );
    assert_eq!(
        compile(&json).unwrap(),
        "EXPLAIN CREATE STREAM copy WITH (VALUE_FORMAT='JSON') AS SELECT * FROM orders;"
    );
}

#[test]
fn test_statement_type_names() {
    let statement = decode(r#"{"type":"SHOW","showType":"QUERIES"}"#);
    assert_eq!(statement.type_name(), "SHOW");
}

#[test]
fn test_feature_list_is_published() {
    assert_eq!(ksqlgen::ksql::sql::VERSION, env!("CARGO_PKG_VERSION"));
    assert!(ksqlgen::ksql::sql::FEATURES.contains(&"window_functions"));
}
