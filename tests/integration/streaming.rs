//! Integration tests for the streaming call

use crate::integration::mock_server::MockAgentFixture;
use futures::StreamExt;
use loadstar_agent::error::TIMEOUT_ANSWER;
use loadstar_agent::{AgentConfig, AgentClient, ChatSession, Emission, Outcome, StepCategory};
use mockito::Matcher;
use serde_json::json;
use std::time::Duration;

fn tuples(emissions: &[Emission]) -> Vec<(&str, &str)> {
    emissions.iter().map(|e| e.as_tuple()).collect()
}

#[tokio::test]
async fn test_end_to_end_scenario() {
    let mut fixture = MockAgentFixture::new().await;
    let mock = fixture
        .mock_sse(&[
            ("response.status", json!({"status": "planning", "message": "Planning approach"})),
            (
                "response.tool_result",
                json!({"content": [{"type": "json", "json": {"sql": "SELECT COUNT(*) FROM LOADS"}}]}),
            ),
            ("response.thinking.delta", json!({"text": "Because..."})),
            ("response.text.delta", json!({"text": "The answer is 42."})),
        ])
        .await;

    let mut stream = fixture.client().ask_stream("How many loads?", None).await;
    let mut emissions = Vec::new();
    while let Some(e) = stream.next().await {
        emissions.push(e);
    }

    assert_eq!(
        tuples(&emissions),
        vec![
            ("status", "Planning approach"),
            ("sql", "SELECT COUNT(*) FROM LOADS"),
            ("thinking", "Because..."),
            ("answer", "The answer is 42."),
        ]
    );

    let transcript = stream.into_transcript();
    assert_eq!(transcript.outcome, Outcome::Completed);
    assert_eq!(transcript.steps.len(), 2);
    assert_eq!(transcript.steps[0].category, StepCategory::Planning);
    assert_eq!(transcript.steps[0].reasoning, "Because...");
    assert_eq!(transcript.steps[1].category, StepCategory::SqlQuery);
    assert_eq!(transcript.answer, "The answer is 42.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_broker_context_prefixes_question() {
    let mut fixture = MockAgentFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", crate::integration::mock_server::AGENT_PATH)
        .match_body(Matcher::Regex(
            "Regarding broker 'Acme Freight': Is this broker risky\\?".to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body("event: response.text.delta\ndata: {\"text\":\"Low risk.\"}\n\n")
        .create_async()
        .await;

    let emissions: Vec<Emission> = fixture
        .client()
        .ask_stream("Is this broker risky?", Some("Acme Freight"))
        .await
        .collect()
        .await;
    assert_eq!(tuples(&emissions), vec![("answer", "Low risk.")]);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_session_context_scopes_the_question() {
    let mut fixture = MockAgentFixture::new().await;
    let mock = fixture
        .server
        .mock("POST", crate::integration::mock_server::AGENT_PATH)
        .match_body(Matcher::Regex(
            "Regarding broker 'Acme Freight': Any late loads\\?".to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "text/event-stream")
        .with_body("event: response.text.delta\ndata: {\"text\":\"Two late loads.\"}\n\n")
        .create_async()
        .await;

    let mut session = ChatSession::with_context("Acme Freight");
    let client = fixture.client();
    let mut stream = client.ask_in_session(&mut session, "Any late loads?").await;
    let emissions: Vec<Emission> = (&mut stream).collect().await;
    assert_eq!(tuples(&emissions), vec![("answer", "Two late loads.")]);

    session.record_assistant(stream.into_transcript());
    assert_eq!(session.turns().len(), 2);
    assert_eq!(session.turns()[1].content, "Two late loads.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_stalled_stream_times_out() {
    let mut fixture = MockAgentFixture::new().await;
    let _m = fixture
        .mock_sse_stalled(
            "event: response.status\ndata: {\"message\": \"Planning\"}\n\n",
            Duration::from_millis(500),
        )
        .await;

    let config = fixture
        .config()
        .with_timeouts(Duration::from_millis(50), Duration::from_secs(90));
    let client = AgentClient::new(config).unwrap();
    let mut stream = client.ask_stream("q", None).await;
    let emissions: Vec<Emission> = (&mut stream).collect().await;

    let answers: Vec<&str> = emissions
        .iter()
        .filter(|e| e.mode.as_str() == "answer")
        .map(|e| e.text.as_str())
        .collect();
    assert_eq!(answers, vec![TIMEOUT_ANSWER]);
    assert_eq!(emissions.last().map(|e| e.text.as_str()), Some(TIMEOUT_ANSWER));
    assert_eq!(stream.into_transcript().outcome, Outcome::TimedOut);
}

#[tokio::test]
async fn test_mixed_revisions_and_junk_frames() {
    let mut fixture = MockAgentFixture::new().await;
    let body = concat!(
        ": keep-alive\n\n",
        "event: status\r\ndata: {\"status\":\"planning\",\"message\":\"Planning...\"}\r\n\r\n",
        "event: status\ndata: {\"status\":\"planning\",\"message\":\"Planning...\"}\n\n",
        "event: response.tool_use\ndata: {\"input\":{\"query\":\"look up the broker\"}}\n\n",
        "event: response.text\ndata: {not json}\n\n",
        "event: response.text\ndata: {\"text\":\"H\"}\n\n",
        "event: response.text\ndata: {\"text\":\"Hello\"}\n\n",
        "event: error\ndata: {\"message\":\"transient\"}\n\n",
        "data: [DONE]\n\n",
    );
    let _m = fixture.mock_sse_raw(body).await;

    let mut stream = fixture.client().ask_stream("q", None).await;
    let emissions: Vec<Emission> = (&mut stream).collect().await;
    assert_eq!(
        tuples(&emissions),
        vec![
            ("status", "Planning..."),
            ("status", "look up the broker"),
            ("answer", "H"),
            ("answer", "Hello"),
        ]
    );
    assert_eq!(stream.into_transcript().steps.len(), 2);
}

#[tokio::test]
async fn test_empty_stream_yields_placeholder() {
    let mut fixture = MockAgentFixture::new().await;
    let _m = fixture
        .mock_sse(&[("response.status", json!({"message": "Planning"}))])
        .await;

    let emissions: Vec<Emission> = fixture.client().ask_stream("q", None).await.collect().await;
    assert_eq!(
        emissions.last().map(|e| e.as_tuple()),
        Some(("answer", "No response from agent."))
    );
}

#[tokio::test]
async fn test_non_200_yields_single_answer() {
    let mut fixture = MockAgentFixture::new().await;
    let _m = fixture.mock_stream_error(503).await;

    let mut stream = fixture.client().ask_stream("q", None).await;
    let emissions: Vec<Emission> = (&mut stream).collect().await;
    assert_eq!(tuples(&emissions), vec![("answer", "Agent returned HTTP 503")]);
    assert_eq!(stream.into_transcript().outcome, Outcome::Failed);
}

#[tokio::test]
async fn test_missing_host_yields_unavailable() {
    let client = AgentClient::new(AgentConfig::new()).unwrap();
    let emissions: Vec<Emission> = client.ask_stream("q", None).await.collect().await;
    assert_eq!(emissions.len(), 1);
    assert_eq!(emissions[0].mode.as_str(), "answer");
    assert!(emissions[0].text.contains("unavailable"));
}

#[tokio::test]
async fn test_rendered_timeline_after_stream() {
    let mut fixture = MockAgentFixture::new().await;
    let _m = fixture
        .mock_sse(&[
            ("response.status", json!({"message": "Executing SQL"})),
            ("response.tool_use", json!({"input": {"sql": "SELECT lane FROM loads WHERE miles > 500"}})),
            ("response.text", json!({"text": "Three lanes."})),
        ])
        .await;

    let mut stream = fixture.client().ask_stream("q", None).await;
    while stream.next().await.is_some() {}
    let html = stream.render();
    assert!(html.contains("⚡</span> Executing SQL"));
    assert!(html.contains("<details"));
    assert!(html.contains("miles &gt; "));
    assert!(html.contains(r#"class="sql-number""#));
}
