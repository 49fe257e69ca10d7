//! Structured activity extraction with schema validation and log fan-out.
//!
//! Model output is parsed as `{"activities": [{weight?, meal?, workout?}, ...]}`.
//! Malformed JSON, a wrong shape or an empty list all fail validation; callers see
//! them exactly like a failed generation call.

use crate::domain::{
    render, ActivityBatch, ActivityEntry, ActivityLogEvent, CallSite, DomainError,
    GenerationJob, GenerationRequest, Purpose, TemplateId,
};
use crate::ports::{GenerationPort, TemplatePort};
use crate::usecases::generator::{Generated, Generator};
use serde::{Deserialize, Deserializer};
use serde_json::json;
use std::sync::Arc;
use tracing::{info, warn};

const EXTRACTION_DIRECTIVE: &str = r#"You are a health data extraction assistant. Extract structured health activity data from the user's message.

Respond only with valid JSON in this format:
{
  "activities": [
    {
      "weight": "70kg",
      "meal": "chicken salad",
      "workout": "30-minute run"
    }
  ]
}

Include a field only when the message mentions it. If no activities are found, return {"activities": []}."#;

const TEMPERATURE: f32 = 0.1;

#[derive(Deserialize)]
struct ActivitiesPayload {
    activities: Vec<PayloadEntry>,
}

/// Wire shape of one entry. A field may be absent, but when present it must be a string.
#[derive(Deserialize)]
struct PayloadEntry {
    #[serde(default, deserialize_with = "present_string")]
    weight: Option<String>,
    #[serde(default, deserialize_with = "present_string")]
    meal: Option<String>,
    #[serde(default, deserialize_with = "present_string")]
    workout: Option<String>,
}

impl From<PayloadEntry> for ActivityEntry {
    fn from(entry: PayloadEntry) -> Self {
        ActivityEntry {
            weight: entry.weight,
            meal: entry.meal,
            workout: entry.workout,
        }
    }
}

/// Only runs for keys that are present, so an explicit `null` is rejected.
fn present_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(Some)
}

pub struct ActivityExtractor {
    ai: Arc<dyn GenerationPort>,
    templates: Arc<dyn TemplatePort>,
}

impl ActivityExtractor {
    pub fn new(ai: Arc<dyn GenerationPort>, templates: Arc<dyn TemplatePort>) -> Self {
        Self { ai, templates }
    }

    /// Extract a validated, non-empty batch from one message.
    pub async fn extract(&self, message: &str) -> Result<ActivityBatch, DomainError> {
        let template = self.templates.load(TemplateId::ExtractActivity).await?;
        let prompt = render(&template, &json!({ "message": message })).map_err(|e| {
            DomainError::TemplateUnavailable {
                template: TemplateId::ExtractActivity.to_string(),
                reason: e.to_string(),
            }
        })?;

        let request = GenerationRequest {
            purpose: Purpose::Extract,
            system_directive: EXTRACTION_DIRECTIVE.to_string(),
            user_content: prompt,
            temperature: TEMPERATURE,
            max_output_tokens: None,
            json_mode: true,
        };
        let raw = self.ai.complete(&request).await?;

        let batch = parse_batch(raw.as_deref()).inspect_err(|e| {
            warn!(
                error = %e,
                raw = %raw.as_deref().unwrap_or_default().chars().take(200).collect::<String>(),
                "extraction output rejected"
            );
        })?;
        info!(entries = batch.len(), "activity extraction successful");
        Ok(batch)
    }
}

#[async_trait::async_trait]
impl Generator for ActivityExtractor {
    fn call_site(&self, _job: &GenerationJob) -> CallSite {
        CallSite::ActivityLog
    }

    async fn generate(&self, job: &GenerationJob) -> Result<Generated, DomainError> {
        let batch = self.extract(&job.message).await?;
        let reply = confirmation_message(&batch);
        let activity_logs = batch
            .into_entries()
            .into_iter()
            .map(|entry| ActivityLogEvent {
                user_id: job.user_id.clone(),
                reply_token: job.reply_token.clone(),
                entry,
            })
            .collect();
        Ok(Generated {
            reply,
            activity_logs,
        })
    }
}

/// Validate raw model output into a batch. A missing completion counts as an empty list.
pub fn parse_batch(raw: Option<&str>) -> Result<ActivityBatch, DomainError> {
    let clean = sanitize_json(raw.unwrap_or(r#"{"activities": []}"#));
    let payload: ActivitiesPayload = serde_json::from_str(&clean)
        .map_err(|e| DomainError::ExtractionSchema(format!("invalid activities payload: {}", e)))?;
    ActivityBatch::new(payload.activities.into_iter().map(ActivityEntry::from).collect())
        .ok_or_else(|| DomainError::ExtractionSchema("activities list is empty".to_string()))
}

/// Human-readable confirmation. One numbered line per entry, in batch order, listing
/// only the fields present.
pub fn confirmation_message(batch: &ActivityBatch) -> String {
    let count = batch.len();
    let noun = if count == 1 { "activity" } else { "activities" };
    let lines: Vec<String> = batch
        .entries()
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            let mut parts = Vec::new();
            if let Some(weight) = &entry.weight {
                parts.push(format!("🏋️ Weight: {}", weight));
            }
            if let Some(meal) = &entry.meal {
                parts.push(format!("🍽️ Meal: {}", meal));
            }
            if let Some(workout) = &entry.workout {
                parts.push(format!("💪 Workout: {}", workout));
            }
            format!("{}. {}", index + 1, parts.join(", "))
                .trim_end()
                .to_string()
        })
        .collect();

    format!(
        "✅ Activity logged successfully! I recorded {} {}:\n\n{}\n\nKeep up the great work! 💪",
        count,
        noun,
        lines.join("\n")
    )
}

/// Strip markdown fences or leading prose around a JSON object.
fn sanitize_json(raw_text: &str) -> String {
    let trimmed = raw_text.trim();

    if trimmed.starts_with("```") {
        let without_prefix = trimmed
            .strip_prefix("```json")
            .or_else(|| trimmed.strip_prefix("```"))
            .unwrap_or(trimmed);
        if let Some(end_idx) = without_prefix.rfind("```") {
            return without_prefix[..end_idx].trim().to_string();
        }
        return without_prefix.trim().to_string();
    }

    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}')) {
        if start < end {
            return trimmed[start..=end].to_string();
        }
    }

    trimmed.to_string()
}
