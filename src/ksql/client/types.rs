//! ksqlDB REST request and response bodies

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Body of `POST /ksql`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KsqlRequest {
    pub ksql: String,
    pub streams_properties: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub command_sequence_number: Option<i64>,
}

/// Lifecycle state of a distributed command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandState {
    Queued,
    Parsing,
    Executing,
    Success,
    Error,
    Terminated,
    #[serde(other)]
    Unknown,
}

impl CommandState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommandState::Queued => "QUEUED",
            CommandState::Parsing => "PARSING",
            CommandState::Executing => "EXECUTING",
            CommandState::Success => "SUCCESS",
            CommandState::Error => "ERROR",
            CommandState::Terminated => "TERMINATED",
            CommandState::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for CommandState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandStatus {
    pub status: CommandState,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KsqlWarning {
    pub message: String,
}

/// One entry of the array returned by `POST /ksql`.
///
/// Only command responses carry `commandStatus`; listing and description entities keep
/// their payload in `details`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KsqlEntity {
    #[serde(rename = "@type", default)]
    pub entity_type: Option<String>,
    #[serde(default)]
    pub statement_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_status: Option<CommandStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_sequence_number: Option<i64>,
    #[serde(default)]
    pub warnings: Vec<KsqlWarning>,
    #[serde(flatten)]
    pub details: HashMap<String, serde_json::Value>,
}

impl KsqlEntity {
    pub fn query_id(&self) -> Option<&str> {
        self.command_status
            .as_ref()
            .and_then(|status| status.query_id.as_deref())
    }
}

/// Error body returned with a non-success status
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KsqlErrorBody {
    #[serde(rename = "@type", default)]
    pub error_type: Option<String>,
    #[serde(rename = "error_code")]
    pub error_code: i64,
    pub message: String,
    #[serde(default)]
    pub statement_text: Option<String>,
    #[serde(default)]
    pub entities: Vec<serde_json::Value>,
}

/// Envelope of `GET /info`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServerInfoResponse {
    #[serde(rename = "KsqlServerInfo")]
    pub info: ServerInfo,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    pub version: String,
    pub kafka_cluster_id: String,
    pub ksql_service_id: String,
    #[serde(default)]
    pub server_status: Option<String>,
}

/// `GET /healthcheck`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthCheck {
    pub is_healthy: bool,
    #[serde(default)]
    pub details: HashMap<String, serde_json::Value>,
}
