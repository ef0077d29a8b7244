// End-to-end tests for the stream consumer and the run launcher,
// against loopback servers

use agentwatch::client::AgentClient;
use agentwatch::stream::{StreamConsumer, StreamSession, StreamState};
use futures::SinkExt;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

/// WebSocket server that sends the given frames to the first client,
/// then closes the socket.
async fn spawn_stream_server(frames: Vec<String>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        if let Ok((stream, _)) = listener.accept().await {
            let mut ws = accept_async(stream).await.unwrap();
            for frame in frames {
                if ws.send(Message::Text(frame)).await.is_err() {
                    return;
                }
            }
            let _ = ws.close(None).await;
        }
    });

    format!("http://{}", addr)
}

/// HTTP server that answers the first request with a canned response.
async fn spawn_http_server(status_line: &'static str, body: String) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        if let Ok((mut stream, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await;

            let response = format!(
                "{}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
        }
    });

    format!("http://{}", addr)
}

#[tokio::test]
async fn test_consumer_appends_events_and_closes_on_completion() {
    let base = spawn_stream_server(vec![
        r#"{"event_type":"connection_established","run_id":"abc","message":"Connected to agent stream"}"#.to_string(),
        r#"{"event_type":"agent_start","run_id":"abc","timestamp":"2024-01-01T00:00:00Z","input_text":"hi"}"#.to_string(),
        r#"{"event_type":"agent_complete","run_id":"abc","timestamp":"2024-01-01T00:00:01Z","final_output":"done"}"#.to_string(),
        // Never processed: the consumer closes on the terminal event above
        r#"{"event_type":"llm_output","run_id":"abc","content":"late"}"#.to_string(),
    ])
    .await;

    let consumer = StreamConsumer::new(&base).unwrap();
    let mut session = StreamSession::new();
    let mut seen = Vec::new();

    consumer
        .attach(&mut session, "abc", |event| {
            seen.push(agentwatch::render::label(event).to_string());
        })
        .await
        .unwrap();

    assert_eq!(session.events().len(), 3);
    assert_eq!(session.state(), StreamState::Completed);
    assert!(!session.state().is_running());
    assert_eq!(seen, vec!["connected", "run started", "run complete"]);
}

#[tokio::test]
async fn test_consumer_skips_malformed_frames() {
    let base = spawn_stream_server(vec![
        r#"{"event_type":"llm_output","run_id":"abc","content":"good"}"#.to_string(),
        "this is not json".to_string(),
        r#"{"event_type":"agent_complete","run_id":"abc","final_output":"done"}"#.to_string(),
    ])
    .await;

    let consumer = StreamConsumer::new(&base).unwrap();
    let mut session = StreamSession::new();

    consumer
        .attach(&mut session, "abc", |_| {})
        .await
        .unwrap();

    assert_eq!(session.events().len(), 2);
    assert_eq!(session.state(), StreamState::Completed);
}

#[tokio::test]
async fn test_consumer_handles_peer_close_without_terminal_event() {
    // Server sends one event and closes the socket
    let base = spawn_stream_server(vec![
        r#"{"event_type":"llm_output","run_id":"abc","content":"partial"}"#.to_string(),
    ])
    .await;

    let consumer = StreamConsumer::new(&base).unwrap();
    let mut session = StreamSession::new();

    consumer
        .attach(&mut session, "abc", |_| {})
        .await
        .unwrap();

    assert_eq!(session.events().len(), 1);
    assert_eq!(session.state(), StreamState::Disconnected);
    assert!(!session.state().is_running());
}

#[tokio::test]
async fn test_consumer_connect_failure_marks_run_errored() {
    // Nothing is listening here
    let consumer = StreamConsumer::new("http://127.0.0.1:1").unwrap();
    let mut session = StreamSession::new();

    let result = consumer.attach(&mut session, "abc", |_| {}).await;

    assert!(result.is_err());
    assert_eq!(session.state(), StreamState::Errored);
    assert!(session.last_error().is_some());
}

#[test]
fn test_stream_url_upgrades_scheme() {
    let consumer = StreamConsumer::new("http://example.com:8000").unwrap();
    assert_eq!(
        consumer.stream_url("abc").unwrap().as_str(),
        "ws://example.com:8000/agent/stream/abc"
    );

    let consumer = StreamConsumer::new("https://example.com/api/v1/").unwrap();
    assert_eq!(
        consumer.stream_url("abc").unwrap().as_str(),
        "wss://example.com/api/v1/agent/stream/abc"
    );
}

#[tokio::test]
async fn test_launch_run_returns_run_id() {
    let base = spawn_http_server(
        "HTTP/1.1 200 OK",
        r#"{"data":{"run_id":"run-123","status":"queued"}}"#.to_string(),
    )
    .await;

    let client = AgentClient::new(base);
    let run_id = client.launch_run("hello").await.unwrap();

    assert_eq!(run_id, "run-123");
}

#[tokio::test]
async fn test_launch_run_surfaces_http_status_on_failure() {
    let base = spawn_http_server(
        "HTTP/1.1 500 Internal Server Error",
        r#"{"message":"Failed to queue agent task"}"#.to_string(),
    )
    .await;

    let client = AgentClient::new(base);
    let result = client.launch_run("hello").await;

    let err = result.unwrap_err().to_string();
    assert!(err.contains("500"));
    assert!(!err.is_empty());
}

#[tokio::test]
async fn test_launch_run_rejects_body_without_run_id() {
    let base = spawn_http_server("HTTP/1.1 200 OK", r#"{"status":"queued"}"#.to_string()).await;

    let client = AgentClient::new(base);
    let result = client.launch_run("hello").await;

    assert!(result.is_err());
}
