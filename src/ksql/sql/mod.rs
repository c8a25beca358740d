// ksqlDB statement compiler
// Turns typed statement trees into validated, canonical ksqlDB statement text

pub mod ast;
pub mod compiler;
pub mod error;

// Re-export main API
pub use ast::KsqlStatement;
pub use compiler::{KsqlStatementCompiler, SqlBuilder};
pub use error::{CompileError, CompileResult};

// Version and feature info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const FEATURES: &[&str] = &[
    "select",          // STAR and COLUMN selects, simple / aggregate / windowed
    "joins",           // STREAM-STREAM with WITHIN, STREAM-TABLE, TABLE-TABLE
    "windows",         // TUMBLING, HOPPING, SESSION, named window references
    "group_by",        // GROUP BY with HAVING and PARTITION BY
    "window_functions", // LAG, LEAD with OVER
    "ddl",             // CREATE STREAM/TABLE (schema or AS SELECT), DROP
    "dml",             // INSERT VALUES, INSERT SELECT
    "admin",           // TERMINATE, SET/SHOW property, LIST, SHOW, DESCRIBE, EXPLAIN
    "json_input",      // serde decoding of the tagged JSON statement model
];
