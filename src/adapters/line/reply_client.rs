//! Implements ReplyPort via the LINE Reply API.

use crate::domain::{DomainError, OutboundReply};
use crate::ports::ReplyPort;
use serde::Serialize;
use tracing::{error, info, warn};

/// LINE rejects text messages longer than this (characters).
pub const MAX_MESSAGE_CHARS: usize = 5000;
const TRUNCATED_CHARS: usize = 4990;

pub struct LineReplyAdapter {
    client: reqwest::Client,
    reply_url: String,
    access_token: Option<String>,
}

impl LineReplyAdapter {
    /// `access_token` of `None` keeps the adapter constructible; every send then fails.
    pub fn new(reply_url: String, access_token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            reply_url,
            access_token,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: Vec<TextMessage>,
}

#[derive(Serialize)]
struct TextMessage {
    #[serde(rename = "type")]
    kind: &'static str,
    text: String,
}

/// Truncate to the platform limit: 4990 characters plus `...`.
pub fn fit_message(message: &str) -> String {
    if message.chars().count() <= MAX_MESSAGE_CHARS {
        return message.to_string();
    }
    let mut truncated: String = message.chars().take(TRUNCATED_CHARS).collect();
    truncated.push_str("...");
    truncated
}

fn validate(reply: &OutboundReply) -> Result<(), DomainError> {
    if reply.message.trim().is_empty() {
        return Err(DomainError::Delivery("empty message".into()));
    }
    if reply.reply_token.is_empty() {
        return Err(DomainError::Delivery("missing reply token".into()));
    }
    if reply.user_id.is_empty() {
        return Err(DomainError::Delivery("missing user id".into()));
    }
    Ok(())
}

#[async_trait::async_trait]
impl ReplyPort for LineReplyAdapter {
    async fn send_reply(&self, reply: &OutboundReply) -> Result<(), DomainError> {
        if let Err(e) = validate(reply) {
            warn!(user_id = %reply.user_id, error = %e, "reply rejected before sending");
            return Err(e);
        }
        let Some(token) = self.access_token.as_deref() else {
            error!(user_id = %reply.user_id, "LINE_CHANNEL_ACCESS_TOKEN not configured");
            return Err(DomainError::Delivery(
                "channel access token not configured".into(),
            ));
        };

        let text = fit_message(&reply.message);
        if text.len() != reply.message.len() {
            warn!(
                user_id = %reply.user_id,
                original_chars = reply.message.chars().count(),
                "message too long for LINE, truncated"
            );
        }
        let body = ReplyRequest {
            reply_token: &reply.reply_token,
            messages: vec![TextMessage { kind: "text", text }],
        };

        let response = self
            .client
            .post(&self.reply_url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(|e| DomainError::Delivery(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if status.is_success() {
            info!(
                user_id = %reply.user_id,
                status = status.as_u16(),
                message_len = reply.message.len(),
                "LINE reply sent"
            );
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        let reason = match status.as_u16() {
            400 => "bad request, invalid payload format",
            401 => "authentication failed, invalid channel access token",
            403 => "forbidden, insufficient permissions",
            429 => "rate limit exceeded",
            _ => "unexpected response",
        };
        error!(
            user_id = %reply.user_id,
            status = status.as_u16(),
            body = %detail,
            "LINE API: {}", reason
        );
        Err(DomainError::Delivery(format!(
            "LINE API {}: {}",
            status.as_u16(),
            reason
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(message: &str, token: &str, user: &str) -> OutboundReply {
        OutboundReply {
            user_id: user.into(),
            message: message.into(),
            reply_token: token.into(),
        }
    }

    #[test]
    fn test_fit_message() {
        assert_eq!(fit_message("short"), "short");
        let exact = "a".repeat(MAX_MESSAGE_CHARS);
        assert_eq!(fit_message(&exact), exact);

        let long = "好".repeat(6000);
        let fitted = fit_message(&long);
        assert_eq!(fitted.chars().count(), 4993);
        assert!(fitted.ends_with("..."));
    }

    #[test]
    fn test_validate() {
        assert!(validate(&reply("hi", "tok", "U1")).is_ok());
        assert!(validate(&reply("  ", "tok", "U1")).is_err());
        assert!(validate(&reply("hi", "", "U1")).is_err());
        assert!(validate(&reply("hi", "tok", "")).is_err());
    }

    #[tokio::test]
    async fn test_missing_token_refuses() {
        let adapter = LineReplyAdapter::new("http://127.0.0.1:9".into(), None);
        let err = adapter
            .send_reply(&reply("hi", "tok", "U1"))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Delivery(ref m) if m.contains("access token")));
    }
}
