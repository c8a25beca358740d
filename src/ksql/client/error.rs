//! Client-side error types
//!
//! Engine rejections keep the ksqlDB error body intact so callers can inspect the
//! `error_code` and the entities the server reported.

use crate::ksql::sql::error::CompileError;

/// Errors raised by [`super::KsqlDbClient`]
#[derive(Debug, thiserror::Error)]
pub enum KsqlDbError {
    /// The statement never left the process because it did not compile
    #[error("Statement compilation failed: {0}")]
    Compile(#[from] CompileError),

    /// Connection, timeout or unexpected HTTP status
    #[error("ksqlDB request failed: {message}")]
    Transport { message: String },

    /// The server parsed the request and rejected the statement
    #[error("ksqlDB error {error_code}: {message}")]
    Engine {
        error_code: i64,
        message: String,
        statement_text: Option<String>,
        entities: Vec<serde_json::Value>,
    },

    /// The command was accepted but did not reach SUCCESS
    #[error("ksqlDB command finished with status {status}: {message}")]
    CommandFailed { status: String, message: String },

    /// A response body did not match the expected shape
    #[error("Failed to decode ksqlDB response: {message}")]
    Decode { message: String },

    #[error("Invalid client configuration: {message}")]
    Config { message: String },
}

pub type KsqlDbResult<T> = Result<T, KsqlDbError>;
