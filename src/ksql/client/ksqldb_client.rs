//! Async ksqlDB REST client
//!
//! Statements are compiled locally before anything is sent, so a statement that fails
//! validation never reaches the server. Requests are retried with exponential backoff on
//! transport errors and 5xx responses; 4xx responses fail immediately.

use super::error::{KsqlDbError, KsqlDbResult};
use super::types::{
    CommandState, HealthCheck, KsqlEntity, KsqlErrorBody, KsqlRequest, ServerInfo,
    ServerInfoResponse,
};
use crate::ksql::config::KsqlDbConfig;
use crate::ksql::sql::ast::{CreateStatement, KsqlStatement, TerminateQuery};
use crate::ksql::sql::compiler::{
    CreateCompiler, KsqlStatementCompiler, SqlBuilder, TerminateCompiler,
};
use log::{debug, error, info, warn};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::Duration;

const KSQL_CONTENT_TYPE: &str = "application/vnd.ksql.v1+json; charset=utf-8";
const KSQL_ACCEPT: &str = "application/vnd.ksql.v1+json";
const MAX_RETRY_DELAY_MS: u64 = 60_000;

/// Client for the ksqlDB `/ksql`, `/info`, `/healthcheck` and query status endpoints
pub struct KsqlDbClient {
    base_url: String,
    http_client: Client,
    config: KsqlDbConfig,
    /// Highest `commandSequenceNumber` seen so far, -1 before the first command
    command_sequence_number: AtomicI64,
}

impl KsqlDbClient {
    /// Create a client, rejecting an invalid configuration.
    pub fn new(config: KsqlDbConfig) -> KsqlDbResult<Self> {
        config.validate()?;
        let base_url = config.base_url();
        info!("ksqlDB client configured for {}", base_url);
        Ok(Self {
            base_url,
            http_client: Client::new(),
            config,
            command_sequence_number: AtomicI64::new(-1),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &KsqlDbConfig {
        &self.config
    }

    /// Highest command sequence number returned by the server, if any.
    pub fn command_sequence_number(&self) -> Option<i64> {
        match self.command_sequence_number.load(Ordering::SeqCst) {
            n if n < 0 => None,
            n => Some(n),
        }
    }

    /// Submit raw statement text to `POST /ksql`.
    ///
    /// `properties` are merged over the configured default stream properties.
    pub async fn execute_statement(
        &self,
        sql: &str,
        properties: Option<&HashMap<String, String>>,
    ) -> KsqlDbResult<Vec<KsqlEntity>> {
        let mut streams_properties = self.config.default_stream_properties.clone();
        if let Some(properties) = properties {
            streams_properties.extend(properties.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        let request = KsqlRequest {
            ksql: sql.to_string(),
            streams_properties,
            command_sequence_number: self.command_sequence_number(),
        };
        debug!("Submitting statement: {}", sql);

        let body = serde_json::to_string(&request).map_err(|e| KsqlDbError::Decode {
            message: format!("Failed to encode request: {}", e),
        })?;
        let url = format!("{}/ksql", self.base_url);
        let response = self.execute_request(Method::POST, &url, Some(body)).await?;
        let entities: Vec<KsqlEntity> = decode(response).await?;

        self.record_sequence_numbers(&entities);
        log_warnings(&entities);
        Ok(entities)
    }

    /// Compile a statement, then submit it.
    pub async fn execute(&self, statement: &KsqlStatement) -> KsqlDbResult<Vec<KsqlEntity>> {
        let sql = KsqlStatementCompiler::build(statement)?;
        self.execute_statement(&sql, None).await
    }

    /// Submit several statements in a single request.
    pub async fn execute_statements<S: AsRef<str>>(
        &self,
        statements: &[S],
    ) -> KsqlDbResult<Vec<KsqlEntity>> {
        let sql = join_statements(statements);
        self.execute_statement(&sql, None).await
    }

    /// Create a stream or table and return the id of the persistent query it started.
    ///
    /// Plain `CREATE STREAM ... WITH (...)` statements start no query and yield `None`.
    pub async fn create_stream(&self, statement: &CreateStatement) -> KsqlDbResult<Option<String>> {
        let sql = CreateCompiler::build(statement)?;
        let entities = self.execute_statement(&sql, None).await?;
        ensure_success(&entities, "create stream")?;
        let query_id = entities.first().and_then(KsqlEntity::query_id).map(str::to_string);
        if let Some(query_id) = &query_id {
            info!("Started persistent query {}", query_id);
        }
        Ok(query_id)
    }

    /// Replace a running query: terminate it, then create the new statement.
    pub async fn update_stream(
        &self,
        query_id: &str,
        statement: &CreateStatement,
    ) -> KsqlDbResult<Option<String>> {
        // a rejected replacement must leave the running query untouched
        CreateCompiler::validate(statement)?;
        self.terminate_query(query_id).await?;
        self.create_stream(statement).await
    }

    pub async fn terminate_query(&self, query_id: &str) -> KsqlDbResult<Vec<KsqlEntity>> {
        let sql = TerminateCompiler::build(&TerminateQuery::new(query_id))?;
        let entities = self.execute_statement(&sql, None).await?;
        ensure_success(&entities, "terminate query")?;
        info!("Terminated query {}", query_id);
        Ok(entities)
    }

    pub async fn pause_query(&self, query_id: &str) -> KsqlDbResult<Vec<KsqlEntity>> {
        self.query_command("PAUSE", query_id).await
    }

    pub async fn resume_query(&self, query_id: &str) -> KsqlDbResult<Vec<KsqlEntity>> {
        self.query_command("RESUME", query_id).await
    }

    /// Raw status document of a persistent query.
    pub async fn query_status(&self, query_id: &str) -> KsqlDbResult<serde_json::Value> {
        TerminateCompiler::validate(&TerminateQuery::new(query_id))?;
        self.get_json(&format!("/queries/{}/status", query_id)).await
    }

    pub async fn server_info(&self) -> KsqlDbResult<ServerInfo> {
        let response: ServerInfoResponse = self.get_json("/info").await?;
        Ok(response.info)
    }

    /// Returns `false` when the server reports itself unhealthy or cannot be reached.
    pub async fn health_check(&self) -> bool {
        match self.get_json::<HealthCheck>("/healthcheck").await {
            Ok(health) => health.is_healthy,
            Err(e) => {
                warn!("ksqlDB health check failed: {}", e);
                false
            }
        }
    }

    async fn query_command(&self, command: &str, query_id: &str) -> KsqlDbResult<Vec<KsqlEntity>> {
        TerminateCompiler::validate(&TerminateQuery::new(query_id))?;
        let sql = format!("{} {};", command, query_id);
        let entities = self.execute_statement(&sql, None).await?;
        ensure_success(&entities, &format!("{} query {}", command.to_lowercase(), query_id))?;
        Ok(entities)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> KsqlDbResult<T> {
        let url = format!("{}{}", self.base_url, path);
        let response = self.execute_request(Method::GET, &url, None).await?;
        decode(response).await
    }

    fn record_sequence_numbers(&self, entities: &[KsqlEntity]) {
        if let Some(max) = entities
            .iter()
            .filter_map(|entity| entity.command_sequence_number)
            .max()
        {
            self.command_sequence_number.fetch_max(max, Ordering::SeqCst);
        }
    }

    /// Execute an HTTP request with retry and exponential backoff
    async fn execute_request(
        &self,
        method: Method,
        url: &str,
        body: Option<String>,
    ) -> KsqlDbResult<Response> {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            let mut request = self
                .http_client
                .request(method.clone(), url)
                .header("Accept", KSQL_ACCEPT)
                .timeout(Duration::from_secs(self.config.timeout_seconds));

            if let Some(auth) = &self.config.auth {
                request = request.basic_auth(&auth.username, Some(&auth.password));
            }

            if let Some(body_content) = &body {
                request = request
                    .header("Content-Type", KSQL_CONTENT_TYPE)
                    .body(body_content.clone());
            }

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    if status.is_success() {
                        return Ok(response);
                    }
                    let error_text = response
                        .text()
                        .await
                        .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
                    last_error = Some(engine_error(status.as_u16(), &error_text));

                    // Don't retry on 4xx errors (client errors)
                    if status.is_client_error() {
                        break;
                    }
                }
                Err(e) => {
                    last_error = Some(KsqlDbError::Transport {
                        message: format!("Request to {} failed: {}", url, e),
                    });
                }
            }

            if attempt < self.config.max_retries {
                let delay = backoff_delay(self.config.retry_delay_ms, attempt);
                warn!(
                    "ksqlDB request attempt {} failed, retrying in {} ms",
                    attempt + 1,
                    delay
                );
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
        }

        let error = last_error.unwrap_or_else(|| KsqlDbError::Transport {
            message: "All retry attempts failed".to_string(),
        });
        error!("ksqlDB request to {} failed: {}", url, error);
        Err(error)
    }
}

/// Join statements into one request body, one terminator each.
fn join_statements<S: AsRef<str>>(statements: &[S]) -> String {
    let parts: Vec<&str> = statements
        .iter()
        .map(|statement| statement.as_ref().trim().trim_end_matches(';').trim_end())
        .filter(|statement| !statement.is_empty())
        .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!("{};", parts.join("; "))
    }
}

/// Map a non-success response to an engine error when the body is a ksqlDB error document.
fn engine_error(status: u16, body: &str) -> KsqlDbError {
    match serde_json::from_str::<KsqlErrorBody>(body) {
        Ok(error) => KsqlDbError::Engine {
            error_code: error.error_code,
            message: error.message,
            statement_text: error.statement_text,
            entities: error.entities,
        },
        Err(_) => KsqlDbError::Transport {
            message: format!("Request failed with status {}: {}", status, body),
        },
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> KsqlDbResult<T> {
    response.json().await.map_err(|e| KsqlDbError::Decode {
        message: e.to_string(),
    })
}

/// Exponential backoff, saturating at [`MAX_RETRY_DELAY_MS`].
fn backoff_delay(retry_delay_ms: u64, attempt: u32) -> u64 {
    if retry_delay_ms == 0 {
        return 0;
    }
    2_u64
        .checked_pow(attempt)
        .and_then(|factor| retry_delay_ms.checked_mul(factor))
        .map_or(MAX_RETRY_DELAY_MS, |delay| delay.min(MAX_RETRY_DELAY_MS))
}

/// The first entity must be a command response that reached SUCCESS.
fn ensure_success(entities: &[KsqlEntity], action: &str) -> KsqlDbResult<()> {
    match entities.first().and_then(|entity| entity.command_status.as_ref()) {
        Some(status) if status.status == CommandState::Success => Ok(()),
        Some(status) => Err(KsqlDbError::CommandFailed {
            status: status.status.to_string(),
            message: if status.message.is_empty() {
                format!("Failed to {}", action)
            } else {
                status.message.clone()
            },
        }),
        None => Err(KsqlDbError::CommandFailed {
            status: "MISSING".to_string(),
            message: format!("Failed to {}: no command status returned", action),
        }),
    }
}

fn log_warnings(entities: &[KsqlEntity]) {
    for warning in entities.iter().flat_map(|entity| &entity.warnings) {
        warn!("ksqlDB warning: {}", warning.message);
    }
}
