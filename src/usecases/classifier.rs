//! Intent classification. Never fails: every problem resolves to `Intent::Chat`.

use crate::domain::{
    render, DomainError, GenerationRequest, Intent, Purpose, TemplateId,
};
use crate::ports::{GenerationPort, TemplatePort};
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

const SYSTEM_DIRECTIVE: &str = "You are a health assistant that sorts user messages into intents. \
Reply with the exact intent name only, nothing else.";

/// Near-deterministic sampling; the answer is a single label.
const TEMPERATURE: f32 = 0.1;
const MAX_OUTPUT_TOKENS: u32 = 50;

pub struct IntentClassifier {
    ai: Arc<dyn GenerationPort>,
    templates: Arc<dyn TemplatePort>,
}

impl IntentClassifier {
    pub fn new(ai: Arc<dyn GenerationPort>, templates: Arc<dyn TemplatePort>) -> Self {
        Self { ai, templates }
    }

    /// Classify one message. Always returns a member of the closed intent set.
    pub async fn classify(&self, text: &str) -> Intent {
        if text.trim().is_empty() {
            debug!("empty text, defaulting to chat");
            return Intent::Chat;
        }
        match self.try_classify(text).await {
            Ok(intent) => intent,
            Err(e) => {
                warn!(error = %e, "intent classification failed, defaulting to chat");
                Intent::Chat
            }
        }
    }

    async fn try_classify(&self, text: &str) -> Result<Intent, DomainError> {
        let template = self.templates.load(TemplateId::ClassifyIntent).await?;
        let labels: Vec<&str> = Intent::ROUTABLE.iter().map(|i| i.label()).collect();
        let prompt = render(&template, &json!({ "intents": labels, "message": text })).map_err(
            |e| DomainError::TemplateUnavailable {
                template: TemplateId::ClassifyIntent.to_string(),
                reason: e.to_string(),
            },
        )?;

        let request = GenerationRequest {
            purpose: Purpose::Classify,
            system_directive: SYSTEM_DIRECTIVE.to_string(),
            user_content: prompt,
            temperature: TEMPERATURE,
            max_output_tokens: Some(MAX_OUTPUT_TOKENS),
            json_mode: false,
        };
        let raw = self.ai.complete(&request).await?;
        let intent = raw.as_deref().map(Intent::from_label).unwrap_or(Intent::Chat);

        info!(
            raw_label = raw.as_deref().unwrap_or_default(),
            intent = %intent,
            "intent classified"
        );
        Ok(intent)
    }
}
