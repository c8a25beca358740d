//! # ksqlgen
//!
//! A typed compiler for ksqlDB statements. Callers build a statement tree (or decode one from
//! JSON), and the compiler validates it and emits a single canonical line of ksqlDB text.
//! A small async REST client submits compiled statements to a ksqlDB server.
//!
//! ## Features
//!
//! - **Closed statement model**: every node family is a Rust enum, so an unknown node kind is
//!   a decode error rather than a runtime surprise
//! - **Fail-closed compilation**: text is only produced once the whole tree validates
//! - **Aggregated diagnostics**: list-shaped nodes report every invalid child in one error
//! - **JSON input**: the tagged JSON statement format decodes straight into the typed model
//! - **REST client**: submit compiled statements, manage persistent queries, check health
//!
//! ## Quick Start
//!
//! ```rust
//! use ksqlgen::ksql::sql::ast::{EmitType, Expression, FromClause, SelectColumn, SelectQuery, SimpleSelect};
//! use ksqlgen::KsqlStatement;
//!
//! let mut select = SimpleSelect::new(
//!     vec![SelectColumn::new(Expression::column("id"))],
//!     FromClause::stream("orders"),
//! );
//! select.emit = Some(EmitType::Changes);
//!
//! let sql = ksqlgen::compile(&KsqlStatement::Select(SelectQuery::Simple(select))).unwrap();
//! assert_eq!(sql, "SELECT id FROM orders EMIT CHANGES;");
//!
//! let same = ksqlgen::compile_json(
//!     r#"{"type":"COLUMN",
//!         "columns":[{"expression":{"type":"COLUMN","sourceColumn":"id"}}],
//!         "from":{"sourceType":"STREAM","source":{"type":"DIRECT","name":"orders","sourceType":"STREAM"}},
//!         "emit":"CHANGES"}"#,
//! ).unwrap();
//! assert_eq!(same, sql);
//! ```

#![allow(clippy::large_enum_variant)]

pub mod ksql;

pub use ksql::client::{KsqlDbClient, KsqlDbError, KsqlDbResult};
pub use ksql::config::KsqlDbConfig;
pub use ksql::sql::compiler::{KsqlStatementCompiler, SqlBuilder};
pub use ksql::sql::error::{CompileError, CompileResult};
pub use ksql::sql::KsqlStatement;

/// Validate and render a statement.
pub fn compile(statement: &KsqlStatement) -> CompileResult<String> {
    KsqlStatementCompiler::build(statement)
}

/// Validate a statement without rendering it.
pub fn validate(statement: &KsqlStatement) -> CompileResult<()> {
    KsqlStatementCompiler::validate(statement)
}

/// Decode a JSON statement document, then compile it.
///
/// Decoding failures are reported as [`CompileError::Shape`].
pub fn compile_json(json: &str) -> CompileResult<String> {
    let statement: KsqlStatement = serde_json::from_str(json)?;
    compile(&statement)
}

/// Decode a JSON statement document, then validate it without rendering.
pub fn validate_json(json: &str) -> CompileResult<()> {
    let statement: KsqlStatement = serde_json::from_str(json)?;
    validate(&statement)
}
