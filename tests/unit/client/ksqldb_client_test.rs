// REST client against an in-process fake ksqlDB server

use ksqlgen::ksql::client::CommandState;
use ksqlgen::ksql::sql::ast::{CreateStatement, TerminateQuery};
use ksqlgen::{KsqlDbClient, KsqlDbConfig, KsqlDbError, KsqlStatement};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Serves one canned response per connection, in order, and records each raw request.
struct FakeKsqlDb {
    base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeKsqlDb {
    async fn start(responses: Vec<(u16, &'static str)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = Arc::clone(&requests);
        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().await.unwrap();
                let request = read_request(&mut stream).await;
                recorded.lock().unwrap().push(request);
                let response = format!(
                    "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    reason(status),
                    body.len(),
                    body
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.ok();
            }
        });

        Self { base_url, requests }
    }

    fn client(&self) -> KsqlDbClient {
        let mut config = KsqlDbConfig::from_url(&self.base_url).unwrap();
        config.max_retries = 2;
        config.retry_delay_ms = 1;
        config.timeout_seconds = 5;
        KsqlDbClient::new(config).unwrap()
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

async fn read_request(stream: &mut TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(header_end) = buffer.windows(4).position(|window| window == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buffer[..header_end]).to_lowercase();
            let length = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .map(|value| value.trim().parse::<usize>().unwrap())
                .unwrap_or(0);
            if buffer.len() >= header_end + 4 + length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

const TERMINATED: &str = r#"[{"@type":"currentStatus","statementText":"TERMINATE CTAS_1;",
    "commandId":"terminate/CTAS_1/execute","commandStatus":{"status":"SUCCESS","message":"Query terminated."},
    "commandSequenceNumber":5,"warnings":[]}]"#;

const CREATED: &str = r#"[{"@type":"currentStatus","statementText":"CREATE STREAM big AS SELECT * FROM orders;",
    "commandId":"stream/BIG/create","commandStatus":{"status":"SUCCESS","message":"Created query with ID CSAS_BIG_7","queryId":"CSAS_BIG_7"},
    "commandSequenceNumber":7,"warnings":[]}]"#;

fn create_as_select() -> CreateStatement {
    serde_json::from_str(
        r#"{"createType":"AS_SELECT","sourceType":"STREAM","sourceName":"big",
            "select":{"type":"STAR","from":{"sourceType":"STREAM",
                "source":{"type":"DIRECT","name":"orders","sourceType":"STREAM"}}},
            "options":{"format":{"valueFormat":"JSON"}}}"#,
    )
    .unwrap()
}

#[tokio::test]
async fn test_terminate_posts_compiled_statement_and_tracks_sequence() {
    let server = FakeKsqlDb::start(vec![(200, TERMINATED), (200, TERMINATED)]).await;
    let client = server.client();
    assert_eq!(client.command_sequence_number(), None);

    let entities = client.terminate_query("CTAS_1").await.unwrap();
    assert_eq!(entities.len(), 1);
    assert_eq!(client.command_sequence_number(), Some(5));

    client.terminate_query("CTAS_1").await.unwrap();

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[0].starts_with("POST /ksql HTTP/1.1"));
    assert!(requests[0].contains(r#""ksql":"TERMINATE CTAS_1;""#));
    assert!(requests[0].contains(r#""streamsProperties":{"auto.offset.reset":"earliest"}"#));
    assert!(!requests[0].contains("commandSequenceNumber"));
    assert!(requests[1].contains(r#""commandSequenceNumber":5"#));
}

#[tokio::test]
async fn test_compile_errors_never_reach_the_server() {
    let server = FakeKsqlDb::start(vec![]).await;
    let client = server.client();

    let statement = KsqlStatement::Terminate(TerminateQuery::new("bad id"));
    let result = client.execute(&statement).await;
    assert!(matches!(result, Err(KsqlDbError::Compile(_))));

    let result = client.pause_query("Q1; DROP STREAM s").await;
    assert!(matches!(result, Err(KsqlDbError::Compile(_))));

    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn test_create_stream_returns_query_id() {
    let server = FakeKsqlDb::start(vec![(200, CREATED)]).await;
    let query_id = server.client().create_stream(&create_as_select()).await.unwrap();
    assert_eq!(query_id.as_deref(), Some("CSAS_BIG_7"));
    assert!(server.requests()[0]
        .contains(r#""ksql":"CREATE STREAM big WITH (VALUE_FORMAT='JSON') AS SELECT * FROM orders;""#));
}

#[tokio::test]
async fn test_update_stream_terminates_then_creates() {
    let server = FakeKsqlDb::start(vec![(200, TERMINATED), (200, CREATED)]).await;
    let query_id = server
        .client()
        .update_stream("CTAS_1", &create_as_select())
        .await
        .unwrap();
    assert_eq!(query_id.as_deref(), Some("CSAS_BIG_7"));

    let requests = server.requests();
    assert!(requests[0].contains("TERMINATE CTAS_1;"));
    assert!(requests[1].contains("CREATE STREAM big"));
}

#[tokio::test]
async fn test_failed_command_status() {
    let server = FakeKsqlDb::start(vec![(
        200,
        r#"[{"@type":"currentStatus","statementText":"PAUSE CSAS_1;",
            "commandStatus":{"status":"ERROR","message":"Query not found"},"commandSequenceNumber":2}]"#,
    )])
    .await;
    match server.client().pause_query("CSAS_1").await {
        Err(KsqlDbError::CommandFailed { status, message }) => {
            assert_eq!(status, CommandState::Error.to_string());
            assert_eq!(message, "Query not found");
        }
        other => panic!("unexpected result {:?}", other.map(|_| ())),
    }
    assert!(server.requests()[0].contains(r#""ksql":"PAUSE CSAS_1;""#));
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let server = FakeKsqlDb::start(vec![
        (503, "unavailable"),
        (
            200,
            r#"{"KsqlServerInfo":{"version":"0.29.0","kafkaClusterId":"kc-1","ksqlServiceId":"default_","serverStatus":"RUNNING"}}"#,
        ),
    ])
    .await;
    let info = server.client().server_info().await.unwrap();
    assert_eq!(info.version, "0.29.0");
    assert_eq!(info.server_status.as_deref(), Some("RUNNING"));

    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert!(requests[1].starts_with("GET /info HTTP/1.1"));
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = FakeKsqlDb::start(vec![(
        400,
        r#"{"@type":"statement_error","error_code":40001,"message":"Stream ORDERS does not exist.",
            "statementText":"DROP STREAM orders;","entities":[]}"#,
    )])
    .await;
    let statement: KsqlStatement =
        serde_json::from_str(r#"{"type":"DROP","sourceType":"STREAM","sourceName":"orders"}"#).unwrap();

    match server.client().execute(&statement).await {
        Err(KsqlDbError::Engine {
            error_code,
            message,
            statement_text,
            ..
        }) => {
            assert_eq!(error_code, 40001);
            assert_eq!(message, "Stream ORDERS does not exist.");
            assert_eq!(statement_text.as_deref(), Some("DROP STREAM orders;"));
        }
        other => panic!("unexpected result {:?}", other.map(|_| ())),
    }
    assert_eq!(server.requests().len(), 1);
}

#[tokio::test]
async fn test_health_check() {
    let server = FakeKsqlDb::start(vec![(200, r#"{"isHealthy":true,"details":{}}"#)]).await;
    assert!(server.client().health_check().await);
    assert!(server.requests()[0].starts_with("GET /healthcheck HTTP/1.1"));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let mut config = KsqlDbConfig::from_url(&format!("http://{}", address)).unwrap();
    config.max_retries = 0;
    let client = KsqlDbClient::new(config).unwrap();
    assert!(!client.health_check().await);
}

#[tokio::test]
async fn test_execute_statements_joins_into_one_request() {
    let server = FakeKsqlDb::start(vec![(200, "[]")]).await;
    let entities = server
        .client()
        .execute_statements(&["LIST STREAMS;", "LIST TABLES;"])
        .await
        .unwrap();
    assert!(entities.is_empty());
    assert!(server.requests()[0].contains(r#""ksql":"LIST STREAMS; LIST TABLES;""#));
}

#[tokio::test]
async fn test_many_retries_against_unreachable_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let yaml = format!(
        "host: 127.0.0.1\nport: {}\nmax_retries: 70\nretry_delay_ms: 0\n",
        address.port()
    );
    let client = KsqlDbClient::new(KsqlDbConfig::from_yaml_str(&yaml).unwrap()).unwrap();
    assert!(matches!(
        client.server_info().await,
        Err(KsqlDbError::Transport { .. })
    ));
}

#[tokio::test]
async fn test_truncated_error_body_is_reported() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        read_request(&mut stream).await;
        stream
            .write_all(b"HTTP/1.1 400 Bad Request\r\nContent-Length: 100\r\nConnection: close\r\n\r\npartial")
            .await
            .unwrap();
        stream.shutdown().await.ok();
    });

    let mut config = KsqlDbConfig::from_url(&base_url).unwrap();
    config.max_retries = 0;
    let client = KsqlDbClient::new(config).unwrap();
    match client.execute_statement("LIST STREAMS;", None).await {
        Err(KsqlDbError::Transport { message }) => {
            assert!(message.contains("<unreadable body:"), "{}", message)
        }
        other => panic!("unexpected result {:?}", other.map(|_| ())),
    }
}
