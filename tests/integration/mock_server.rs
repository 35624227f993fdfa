//! Mock agent endpoint for integration tests

use loadstar_agent::{AgentClient, AgentConfig};
use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::Value;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

pub const AGENT_PATH: &str = "/api/v2/databases/TEST_DB/schemas/TEST_SCHEMA/agents/TEST_AGENT:run";
pub const TOKEN: &str = "test-session-token";

/// Mock server plus a session token file the client can read.
pub struct MockAgentFixture {
    pub server: ServerGuard,
    token_path: PathBuf,
}

impl MockAgentFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let token_path =
            std::env::temp_dir().join(format!("loadstar-token-{}", uuid::Uuid::new_v4()));
        std::fs::write(&token_path, format!("{}\n", TOKEN)).unwrap();
        Self { server, token_path }
    }

    pub fn config(&self) -> AgentConfig {
        AgentConfig::new()
            .with_base_url(self.server.url())
            .with_agent("TEST_DB", "TEST_SCHEMA", "TEST_AGENT")
            .with_token_path(&self.token_path)
    }

    pub fn client(&self) -> AgentClient {
        AgentClient::new(self.config()).unwrap()
    }

    /// Successful `text/event-stream` response made of `(event, data)` frames.
    pub async fn mock_sse(&mut self, frames: &[(&str, Value)]) -> Mock {
        let body: String = frames
            .iter()
            .map(|(event, data)| format!("event: {}\ndata: {}\n\n", event, data))
            .collect();
        self.mock_sse_raw(&body).await
    }

    /// Successful `text/event-stream` response with a hand-written body.
    pub async fn mock_sse_raw(&mut self, body: &str) -> Mock {
        self.server
            .mock("POST", AGENT_PATH)
            .match_header("authorization", format!("Bearer {}", TOKEN).as_str())
            .match_header("x-snowflake-authorization-token-type", "OAUTH")
            .match_header("accept", "text/event-stream")
            .match_body(Matcher::PartialJson(serde_json::json!({"stream": true})))
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_body(body)
            .create_async()
            .await
    }

    /// Event stream that sends `first` and then goes quiet for `stall`.
    pub async fn mock_sse_stalled(&mut self, first: &str, stall: Duration) -> Mock {
        let first = first.to_string();
        self.server
            .mock("POST", AGENT_PATH)
            .match_header("accept", "text/event-stream")
            .with_status(200)
            .with_header("content-type", "text/event-stream")
            .with_chunked_body(move |w| {
                w.write_all(first.as_bytes())?;
                w.flush()?;
                std::thread::sleep(stall);
                w.write_all(b"event: response.text\ndata: {\"text\": \"too late\"}\n\n")
            })
            .create_async()
            .await
    }

    /// JSON response with the given status, for the non-streaming call.
    pub async fn mock_json(&mut self, status: usize, body: &str) -> Mock {
        self.server
            .mock("POST", AGENT_PATH)
            .match_header("accept", "application/json")
            .match_body(Matcher::PartialJson(serde_json::json!({"stream": false})))
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }

    /// Error status on the streaming call.
    pub async fn mock_stream_error(&mut self, status: usize) -> Mock {
        self.server
            .mock("POST", AGENT_PATH)
            .with_status(status)
            .with_body("unavailable")
            .create_async()
            .await
    }
}

impl Drop for MockAgentFixture {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.token_path);
    }
}
