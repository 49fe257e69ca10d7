use health_companion::adapters::ai::OpenAiAdapter;
use health_companion::adapters::line::LineReplyAdapter;
use health_companion::domain::{
    DomainError, GenerationFailure, GenerationRequest, OutboundReply, Purpose,
};
use health_companion::ports::{GenerationPort, ReplyPort};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(json_mode: bool) -> GenerationRequest {
    GenerationRequest {
        purpose: Purpose::Chat,
        system_directive: "You are a coach.".to_string(),
        user_content: "Hello".to_string(),
        temperature: 0.7,
        max_output_tokens: Some(400),
        json_mode,
    }
}

fn adapter(server: &MockServer) -> OpenAiAdapter {
    OpenAiAdapter::new(
        format!("{}/v1/chat/completions", server.uri()),
        "test-key".to_string(),
        "gpt-4o-mini".to_string(),
    )
}

#[tokio::test]
async fn test_openai_completion() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 400,
            "messages": [
                {"role": "system", "content": "You are a coach."},
                {"role": "user", "content": "Hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "Stay hydrated! 💧"},
                "finish_reason": "stop"
            }]
        })))
        .mount(&mock_server)
        .await;

    let content = adapter(&mock_server).complete(&request(false)).await.unwrap();
    assert_eq!(content.as_deref(), Some("Stay hydrated! 💧"));
}

#[tokio::test]
async fn test_openai_json_mode_sets_response_format() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"response_format": {"type": "json_object"}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "{\"activities\": []}"}}]
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let content = adapter(&mock_server).complete(&request(true)).await.unwrap();
    assert_eq!(content.as_deref(), Some("{\"activities\": []}"));
}

#[tokio::test]
async fn test_openai_null_content_is_none() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": null}}]
        })))
        .mount(&mock_server)
        .await;

    assert_eq!(adapter(&mock_server).complete(&request(false)).await.unwrap(), None);
}

#[tokio::test]
async fn test_openai_insufficient_quota_is_tagged() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {
                "message": "You exceeded your current quota, please check your plan and billing details.",
                "type": "insufficient_quota",
                "param": null,
                "code": "insufficient_quota"
            }
        })))
        .mount(&mock_server)
        .await;

    let err = adapter(&mock_server).complete(&request(false)).await.unwrap_err();
    match &err {
        DomainError::Generation { status, code, .. } => {
            assert_eq!(*status, Some(429));
            assert_eq!(code.as_deref(), Some("insufficient_quota"));
        }
        other => panic!("expected generation error, got {:?}", other),
    }
    assert!(GenerationFailure::classify(&err).is_quota());
}

#[tokio::test]
async fn test_openai_server_error_is_other() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&mock_server)
        .await;

    let err = adapter(&mock_server).complete(&request(false)).await.unwrap_err();
    assert!(!GenerationFailure::classify(&err).is_quota());
    assert!(matches!(err, DomainError::Generation { status: Some(500), code: None, .. }));
}

#[tokio::test]
async fn test_openai_unreachable_has_no_status() {
    let adapter = OpenAiAdapter::new(
        "http://127.0.0.1:9/v1/chat/completions".to_string(),
        "k".to_string(),
        "m".to_string(),
    );
    let err = adapter.complete(&request(false)).await.unwrap_err();
    assert!(matches!(err, DomainError::Generation { status: None, .. }));
}

fn reply(message: &str) -> OutboundReply {
    OutboundReply {
        user_id: "U1".to_string(),
        message: message.to_string(),
        reply_token: "reply-token-1".to_string(),
    }
}

#[tokio::test]
async fn test_line_reply_payload() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v2/bot/message/reply"))
        .and(header("authorization", "Bearer line-token"))
        .and(body_partial_json(json!({
            "replyToken": "reply-token-1",
            "messages": [{"type": "text", "text": "Great job!"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let adapter = LineReplyAdapter::new(
        format!("{}/v2/bot/message/reply", mock_server.uri()),
        Some("line-token".to_string()),
    );
    adapter.send_reply(&reply("Great job!")).await.unwrap();
}

#[tokio::test]
async fn test_line_reply_truncates_long_message() {
    let mock_server = MockServer::start().await;
    let expected = format!("{}...", "a".repeat(4990));

    Mock::given(method("POST"))
        .and(body_partial_json(json!({"messages": [{"type": "text", "text": expected}]})))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&mock_server)
        .await;

    let adapter = LineReplyAdapter::new(mock_server.uri(), Some("t".to_string()));
    adapter.send_reply(&reply(&"a".repeat(6000))).await.unwrap();
}

#[tokio::test]
async fn test_line_reply_error_status_is_delivery_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "Authentication failed"})))
        .mount(&mock_server)
        .await;

    let adapter = LineReplyAdapter::new(mock_server.uri(), Some("bad".to_string()));
    let err = adapter.send_reply(&reply("hi")).await.unwrap_err();
    assert!(matches!(err, DomainError::Delivery(ref m) if m.contains("401")));
}

#[tokio::test]
async fn test_line_reply_rejects_empty_without_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let adapter = LineReplyAdapter::new(mock_server.uri(), Some("t".to_string()));
    assert!(adapter.send_reply(&reply("")).await.is_err());
}
