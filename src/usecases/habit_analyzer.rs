//! Habit analysis over a user's recent activity records.

use crate::domain::{
    render, CallSite, DomainError, GenerationJob, GenerationRequest, Purpose, TemplateId,
};
use crate::ports::{ActivityStorePort, GenerationPort, TemplatePort};
use crate::usecases::generator::{non_blank, Generated, Generator};
use serde_json::json;
use std::sync::Arc;
use tracing::info;

const HEALTH_COACH_DIRECTIVE: &str = "You are a professional health coach and nutritionist giving personalized health insights.

Guidelines for the analysis:
- Look for patterns in weight, nutrition and exercise
- Give specific, actionable recommendations
- Be encouraging and supportive
- Balance positive reinforcement with areas to improve
- Use emojis to keep it engaging
- Be concise but comprehensive
- Organize the answer into clear sections";

const TEMPERATURE: f32 = 0.7;
const MAX_OUTPUT_TOKENS: u32 = 700;

/// Number of records handed to the model.
pub const DEFAULT_HISTORY_LIMIT: usize = 14;

pub const EMPTY_ANALYSIS_REPLY: &str = "Unable to generate a detailed analysis at this time. Please ensure you have some activity logs recorded and try again.";

pub struct HabitAnalyzer {
    ai: Arc<dyn GenerationPort>,
    templates: Arc<dyn TemplatePort>,
    store: Arc<dyn ActivityStorePort>,
    history_limit: usize,
}

impl HabitAnalyzer {
    pub fn new(
        ai: Arc<dyn GenerationPort>,
        templates: Arc<dyn TemplatePort>,
        store: Arc<dyn ActivityStorePort>,
    ) -> Self {
        Self {
            ai,
            templates,
            store,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Summarize the user's recent habits.
    ///
    /// # Errors
    /// `TemplateUnavailable` before any store read or generation call; store and
    /// generation errors as reported by the ports.
    pub async fn analyze(&self, user_id: &str) -> Result<String, DomainError> {
        let template = self.templates.load(TemplateId::AnalyzeHealth).await?;
        let logs = self
            .store
            .recent_activity(user_id, self.history_limit)
            .await?;

        let prompt = render(&template, &json!({ "logs": logs })).map_err(|e| {
            DomainError::TemplateUnavailable {
                template: TemplateId::AnalyzeHealth.to_string(),
                reason: e.to_string(),
            }
        })?;

        let request = GenerationRequest {
            purpose: Purpose::Analyze,
            system_directive: HEALTH_COACH_DIRECTIVE.to_string(),
            user_content: prompt,
            temperature: TEMPERATURE,
            max_output_tokens: Some(MAX_OUTPUT_TOKENS),
            json_mode: false,
        };
        let summary = non_blank(self.ai.complete(&request).await?)
            .unwrap_or_else(|| EMPTY_ANALYSIS_REPLY.to_string());

        info!(
            user_id,
            records = logs.len(),
            analysis_len = summary.len(),
            "habit analysis generated"
        );
        Ok(summary)
    }
}

#[async_trait::async_trait]
impl Generator for HabitAnalyzer {
    fn call_site(&self, _job: &GenerationJob) -> CallSite {
        CallSite::HabitAnalysis
    }

    async fn generate(&self, job: &GenerationJob) -> Result<Generated, DomainError> {
        self.analyze(&job.user_id).await.map(Generated::text)
    }
}
