//! Webhook edge. Maps LINE webhook events into `InboundMessage` and hands each to the
//! inbound port.

use crate::domain::{InboundMessage, MessageBody, SourceType};
use crate::ports::InboundPort;
use axum::extract::State;
use axum::response::Json;
use axum::routing::get;
use axum::Router;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Clone)]
struct WebhookState {
    inbound: Arc<dyn InboundPort>,
}

/// `{destination, events[]}` as posted by the platform.
#[derive(Debug, Deserialize)]
pub struct WebhookBody {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<LineEvent>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineEvent {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub source: Option<LineSource>,
    #[serde(default)]
    pub message: Option<LineMessage>,
    #[serde(default)]
    pub reply_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSource {
    #[serde(rename = "type")]
    pub kind: SourceType,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub group_id: Option<String>,
    #[serde(default)]
    pub room_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LineMessage {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Build the HTTP router: `GET|POST /webhook` and `GET /health`.
pub fn build_router(inbound: Arc<dyn InboundPort>) -> Router {
    Router::new()
        .route("/webhook", get(verify).post(receive))
        .route("/health", get(health))
        .with_state(WebhookState { inbound })
}

async fn health() -> &'static str {
    "ok"
}

/// Verification ping sent when the webhook URL is registered.
async fn verify() -> Json<Value> {
    info!("LINE webhook verification request received");
    Json(json!({
        "message": "LINE webhook endpoint is ready",
        "timestamp": Utc::now().timestamp_millis(),
    }))
}

async fn receive(State(state): State<WebhookState>, Json(body): Json<WebhookBody>) -> Json<Value> {
    let messages: Vec<InboundMessage> = body.events.iter().filter_map(to_inbound).collect();

    if messages.is_empty() {
        info!(
            events = body.events.len(),
            destination = body.destination.as_deref().unwrap_or_default(),
            "no user message in webhook payload"
        );
        return Json(json!({ "message": "No user message to process" }));
    }

    let mut accepted = 0usize;
    for message in messages {
        let user_id = message.user_id.clone();
        let kind = message.body.kind().to_string();
        match state.inbound.accept(message).await {
            Ok(()) => {
                accepted += 1;
                info!(user_id = %user_id, kind = %kind, "LINE message accepted");
            }
            Err(e) => error!(user_id = %user_id, error = %e, "failed to publish LINE message"),
        }
    }

    Json(json!({ "message": "Messages processed successfully", "accepted": accepted }))
}

/// Map one webhook event. Non-message events and events without a sender id or reply
/// token yield `None`.
pub fn to_inbound(event: &LineEvent) -> Option<InboundMessage> {
    if event.kind != "message" {
        return None;
    }
    let (Some(source), Some(message)) = (&event.source, &event.message) else {
        warn!(kind = %event.kind, "message event without source or message, skipping");
        return None;
    };
    let Some(user_id) = [&source.user_id, &source.group_id, &source.room_id]
        .into_iter()
        .flatten()
        .find(|id| !id.is_empty())
    else {
        warn!(source_type = ?source.kind, "message event without any sender id, skipping");
        return None;
    };
    let Some(reply_token) = event.reply_token.as_ref().filter(|t| !t.is_empty()) else {
        warn!(user_id = %user_id, "message event without reply token, skipping");
        return None;
    };

    let body = match (message.kind.as_str(), &message.text, &message.id) {
        ("text", Some(text), _) => MessageBody::Text { text: text.clone() },
        ("image", _, Some(id)) => MessageBody::Image { id: id.clone() },
        (kind, _, _) => MessageBody::Unsupported {
            kind: kind.to_string(),
        },
    };

    Some(InboundMessage {
        user_id: user_id.clone(),
        source_type: source.kind,
        reply_token: reply_token.clone(),
        timestamp: event.timestamp,
        body,
    })
}
