use axum::body::Body;
use axum::http::{Request, StatusCode};
use health_companion::adapters::line::build_router;
use health_companion::domain::{DomainError, InboundMessage, MessageBody, SourceType};
use health_companion::ports::InboundPort;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

#[derive(Default)]
struct Collecting {
    messages: Mutex<Vec<InboundMessage>>,
}

#[async_trait::async_trait]
impl InboundPort for Collecting {
    async fn accept(&self, message: InboundMessage) -> Result<(), DomainError> {
        self.messages.lock().unwrap().push(message);
        Ok(())
    }
}

fn post_webhook(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/webhook")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_verification_ping() {
    let app = build_router(Arc::new(Collecting::default()));
    let response = app
        .oneshot(Request::builder().uri("/webhook").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["message"], "LINE webhook endpoint is ready");
    assert!(body["timestamp"].is_i64());
}

#[tokio::test]
async fn test_health() {
    let app = build_router(Arc::new(Collecting::default()));
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], b"ok");
}

#[tokio::test]
async fn test_message_events_are_published() {
    let inbound = Arc::new(Collecting::default());
    let app = build_router(inbound.clone());

    let response = app
        .oneshot(post_webhook(json!({
            "destination": "Ubot",
            "events": [
                {
                    "type": "message",
                    "mode": "active",
                    "timestamp": 1736300000000i64,
                    "source": {"type": "user", "userId": "U1"},
                    "message": {"type": "text", "id": "m1", "text": "I ran 5km today"},
                    "replyToken": "rt-1"
                },
                {
                    "type": "follow",
                    "timestamp": 1736300000001i64,
                    "source": {"type": "user", "userId": "U2"},
                    "replyToken": "rt-2"
                },
                {
                    "type": "message",
                    "timestamp": 1736300000002i64,
                    "source": {"type": "room", "roomId": "R1"},
                    "message": {"type": "image", "id": "img-1", "contentProvider": {"type": "line"}},
                    "replyToken": "rt-3"
                }
            ]
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["accepted"], 2);

    let messages = inbound.messages.lock().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].user_id, "U1");
    assert_eq!(messages[0].text(), Some("I ran 5km today"));
    assert_eq!(messages[0].timestamp, 1736300000000);
    assert_eq!(messages[1].user_id, "R1");
    assert_eq!(messages[1].source_type, SourceType::Room);
    assert_eq!(
        messages[1].body,
        MessageBody::Image {
            id: "img-1".to_string()
        }
    );
}

#[tokio::test]
async fn test_no_message_events() {
    let inbound = Arc::new(Collecting::default());
    let app = build_router(inbound.clone());

    let response = app
        .oneshot(post_webhook(json!({"destination": "Ubot", "events": []})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["message"], "No user message to process");
    assert!(inbound.messages.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_malformed_body_is_rejected() {
    let app = build_router(Arc::new(Collecting::default()));
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/webhook")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}
