// Shared fixtures for compiler tests

use ksqlgen::{CompileResult, KsqlStatement};

/// `{"sourceType":"STREAM","source":{"type":"DIRECT","name":<name>,"sourceType":"STREAM"}}`
pub fn stream_from(name: &str) -> String {
    format!(
        r#"{{"sourceType":"STREAM","source":{{"type":"DIRECT","name":"{}","sourceType":"STREAM"}}}}"#,
        name
    )
}

pub fn table_from(name: &str) -> String {
    format!(
        r#"{{"sourceType":"TABLE","source":{{"type":"DIRECT","name":"{}","sourceType":"TABLE"}}}}"#,
        name
    )
}

pub fn column(name: &str) -> String {
    format!(r#"{{"type":"COLUMN","sourceColumn":"{}"}}"#, name)
}

pub fn literal(value: &str) -> String {
    format!(r#"{{"type":"LITERAL","value":{}}}"#, value)
}

pub fn count_star() -> String {
    r#"{"type":"TRANSFORMATION","value":{"type":"AGGREGATE","function":"COUNT"}}"#.to_string()
}

pub fn decode(json: &str) -> KsqlStatement {
    serde_json::from_str(json).unwrap_or_else(|e| panic!("failed to decode {}: {}", json, e))
}

pub fn compile(json: &str) -> CompileResult<String> {
    ksqlgen::compile_json(json)
}
