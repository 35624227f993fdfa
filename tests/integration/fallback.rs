//! Integration tests for the non-streaming fallback call

use crate::integration::mock_server::MockAgentFixture;
use serde_json::json;

#[tokio::test]
async fn test_messages_list_response() {
    let mut fixture = MockAgentFixture::new().await;
    let body = json!({"messages": [
        {"role": "user", "content": [{"type": "text", "text": "q"}]},
        {"role": "assistant", "content": [
            {"type": "text", "text": "Acme Freight has 12 open loads."},
            {"type": "text", "text": "Risk is low."}
        ]}
    ]});
    let mock = fixture.mock_json(200, &body.to_string()).await;

    let answer = fixture.client().ask("How many loads?", Some("Acme Freight")).await;
    assert_eq!(answer, "Acme Freight has 12 open loads.\nRisk is low.");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_singular_message_response() {
    let mut fixture = MockAgentFixture::new().await;
    let body = json!({"message": {"role": "assistant", "content": "Single answer."}});
    let _m = fixture.mock_json(200, &body.to_string()).await;

    assert_eq!(fixture.client().ask("q", None).await, "Single answer.");
}

#[tokio::test]
async fn test_unrecognized_body_yields_placeholder() {
    let mut fixture = MockAgentFixture::new().await;
    let _m = fixture.mock_json(200, r#"{"request_id":"abc"}"#).await;

    assert_eq!(fixture.client().ask("q", None).await, "No response from agent.");
}

#[tokio::test]
async fn test_error_status_is_reported() {
    let mut fixture = MockAgentFixture::new().await;
    let _m = fixture.mock_json(401, r#"{"message":"expired"}"#).await;

    assert_eq!(fixture.client().ask("q", None).await, "Agent returned HTTP 401");
}

#[tokio::test]
async fn test_invalid_json_body_is_an_error_string() {
    let mut fixture = MockAgentFixture::new().await;
    let _m = fixture.mock_json(200, "not json").await;

    let answer = fixture.client().ask("q", None).await;
    assert!(answer.starts_with("Agent error:"));
}
