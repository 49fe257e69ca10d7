//! OpenAI-compatible adapter for text generation.
//!
//! Works against the OpenAI API, Azure OpenAI and local Ollama instances.
//! Implements `GenerationPort`; upstream errors keep their HTTP status and provider
//! error code so the degradation policy can tell quota exhaustion apart.

use crate::domain::{DomainError, GenerationRequest};
use crate::ports::GenerationPort;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// OpenAI-compatible generation adapter.
///
/// Can be configured to work with:
/// - OpenAI API (api.openai.com)
/// - Azure OpenAI
/// - Ollama (localhost)
/// - Any OpenAI-compatible API
pub struct OpenAiAdapter {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl OpenAiAdapter {
    /// Create a new OpenAI adapter.
    ///
    /// # Arguments
    /// * `api_url` - API endpoint (e.g., "https://api.openai.com/v1/chat/completions")
    /// * `api_key` - API key (can be empty for local Ollama)
    /// * `model` - Model name (e.g., "gpt-4o-mini", "llama3.2")
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            api_key,
            model,
        }
    }

    fn build_body(&self, request: &GenerationRequest) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system_directive.clone(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.user_content.clone(),
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_output_tokens,
            response_format: request.json_mode.then(|| ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        }
    }
}

/// OpenAI API request structure.
#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

/// OpenAI API response structure.
#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Deserialize)]
struct MessageContent {
    #[serde(default)]
    content: Option<String>,
}

/// Error envelope: `{"error": {"message": ..., "code": ...}}`.
#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<serde_json::Value>,
}

/// Pulls the provider error code and message out of an error body, if it parses.
fn parse_error_body(text: &str) -> (Option<String>, Option<String>) {
    match serde_json::from_str::<ErrorEnvelope>(text) {
        Ok(envelope) => {
            let code = envelope.error.code.and_then(|c| match c {
                serde_json::Value::String(s) => Some(s),
                serde_json::Value::Null => None,
                other => Some(other.to_string()),
            });
            (code, envelope.error.message)
        }
        Err(_) => (None, None),
    }
}

#[async_trait::async_trait]
impl GenerationPort for OpenAiAdapter {
    async fn complete(&self, request: &GenerationRequest) -> Result<Option<String>, DomainError> {
        info!(
            purpose = ?request.purpose,
            model = %self.model,
            prompt_len = request.user_content.len(),
            json_mode = request.json_mode,
            "sending generation request"
        );

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.build_body(request))
            .send()
            .await
            .map_err(|e| DomainError::generation(format!("HTTP request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            warn!(status = %status, body = %text, "AI API returned error");
            let (code, message) = parse_error_body(&text);
            return Err(DomainError::Generation {
                status: Some(status.as_u16()),
                code,
                message: message
                    .unwrap_or_else(|| text.chars().take(200).collect::<String>()),
            });
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| DomainError::generation(format!("Failed to parse API response: {}", e)))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);

        debug!(
            purpose = ?request.purpose,
            content_len = content.as_ref().map(String::len).unwrap_or(0),
            "received AI response"
        );
        Ok(content)
    }
}
