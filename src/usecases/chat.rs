//! Open health chat. Single-turn, no structured output.

use crate::domain::{CallSite, DomainError, GenerationJob, GenerationRequest, Purpose};
use crate::ports::GenerationPort;
use crate::usecases::generator::{non_blank, Generated, Generator};
use std::sync::Arc;
use tracing::info;

const ASSISTANT_DIRECTIVE: &str = "You are a friendly, knowledgeable health and fitness assistant. Your role is to:

- Give helpful, accurate health and fitness information
- Encourage users on their wellness journey
- Offer practical, actionable advice
- Be supportive and motivating
- Use emojis to keep the conversation engaging
- Keep answers concise but informative
- Always recommend consulting a healthcare professional for medical questions

Features you can mention:
• Activity logging: \"I weighed 70kg and had a salad\"
• Meal planning: \"suggest a meal plan\"
• Workout planning: \"I need a workout plan\"
• Health analysis: \"analyze my habits\"

Stay conversational, helpful and focused on health.";

const TEMPERATURE: f32 = 0.7;
const MAX_OUTPUT_TOKENS: u32 = 400;

pub const EMPTY_CHAT_REPLY: &str = "I'm here to help with your health journey! Feel free to ask me about nutrition, exercise, or wellness tips. 💪";

pub struct ChatResponder {
    ai: Arc<dyn GenerationPort>,
}

impl ChatResponder {
    pub fn new(ai: Arc<dyn GenerationPort>) -> Self {
        Self { ai }
    }

    pub async fn chat(&self, message: &str) -> Result<String, DomainError> {
        let request = GenerationRequest {
            purpose: Purpose::Chat,
            system_directive: ASSISTANT_DIRECTIVE.to_string(),
            user_content: message.to_string(),
            temperature: TEMPERATURE,
            max_output_tokens: Some(MAX_OUTPUT_TOKENS),
            json_mode: false,
        };
        let answer = non_blank(self.ai.complete(&request).await?)
            .unwrap_or_else(|| EMPTY_CHAT_REPLY.to_string());
        info!(answer_len = answer.len(), "chat answer generated");
        Ok(answer)
    }
}

#[async_trait::async_trait]
impl Generator for ChatResponder {
    fn call_site(&self, _job: &GenerationJob) -> CallSite {
        CallSite::Chat
    }

    async fn generate(&self, job: &GenerationJob) -> Result<Generated, DomainError> {
        self.chat(&job.message).await.map(Generated::text)
    }
}
