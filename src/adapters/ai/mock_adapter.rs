//! Mock AI adapter for running without API calls.
//!
//! Deterministic responses per request purpose: keyword intent labels, regex
//! activity extraction and canned text. Used when no API key is configured.

use crate::domain::{DomainError, GenerationRequest, Intent, Purpose};
use crate::ports::GenerationPort;
use regex::Regex;
use serde_json::{json, Map, Value};
use std::sync::LazyLock;
use std::time::Duration;
use tracing::info;

static WEIGHT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(kg|kgs|lbs?|公斤)").expect("valid weight regex")
});
static WORKOUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(ran|run|walked|swam|cycled|lifted|yoga|gym)\b[^.,;!]*")
        .expect("valid workout regex")
});
static MEAL_RE: LazyLock<Regex> = LazyLock::new(|| {
    // The meal ends at punctuation or at a conjunction introducing the next activity.
    Regex::new(r"(?i)\b(?:ate|had|eat)\s+(.+?)(?:\s+(?:and|then|but|before|after)\b|[.,;!\n]|$)")
        .expect("valid meal regex")
});

/// Prompt templates end with the user's text on a line starting with this marker.
const MESSAGE_MARKER: &str = "Message:";

/// Mock generation adapter.
///
/// Returns predetermined responses without making API calls.
/// Simulates network latency with configurable delay.
pub struct MockAiAdapter {
    /// Simulated network delay in milliseconds.
    delay_ms: u64,
}

impl MockAiAdapter {
    /// Create a new mock adapter with default delay (100ms).
    pub fn new() -> Self {
        Self { delay_ms: 100 }
    }

    /// Create a mock adapter with custom delay.
    pub fn with_delay(delay_ms: u64) -> Self {
        Self { delay_ms }
    }

    /// The user's text: whatever follows the last `Message:` line of a rendered prompt.
    fn user_text(prompt: &str) -> &str {
        prompt
            .rfind(MESSAGE_MARKER)
            .map(|idx| prompt[idx + MESSAGE_MARKER.len()..].trim())
            .unwrap_or(prompt)
    }

    fn classify(text: &str) -> Intent {
        let lower = Self::user_text(text).to_lowercase();
        let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));
        if has(&["analyze", "analyse", "habit", "progress"]) {
            Intent::AnalyzeHabits
        } else if has(&["meal plan", "meal", "diet", "recipe"]) && !has(&["ate ", "had "]) {
            Intent::PlanMeal
        } else if has(&["workout plan", "workout", "exercise routine", "training plan"])
            && !has(&["ran ", "did "])
        {
            Intent::PlanWorkout
        } else if has(&["ran ", "km", "weigh", "kg", "ate ", "had ", "walked", "swam"]) {
            Intent::LogActivity
        } else {
            Intent::Chat
        }
    }

    fn extract(prompt: &str) -> Value {
        let text = Self::user_text(prompt);
        let mut entry = Map::new();
        if let Some(caps) = WEIGHT_RE.captures(text) {
            entry.insert("weight".into(), json!(format!("{}{}", &caps[1], &caps[2])));
        }
        if let Some(caps) = MEAL_RE.captures(text) {
            entry.insert("meal".into(), json!(caps[1].trim()));
        }
        if let Some(m) = WORKOUT_RE.find(text) {
            entry.insert("workout".into(), json!(m.as_str().trim()));
        }
        if entry.is_empty() {
            json!({ "activities": [] })
        } else {
            json!({ "activities": [entry] })
        }
    }
}

impl Default for MockAiAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl GenerationPort for MockAiAdapter {
    async fn complete(&self, request: &GenerationRequest) -> Result<Option<String>, DomainError> {
        info!(
            purpose = ?request.purpose,
            prompt_len = request.user_content.len(),
            "[MOCK] Simulating generation"
        );

        tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;

        let output = match request.purpose {
            Purpose::Classify => Self::classify(&request.user_content).label().to_string(),
            Purpose::Extract => Self::extract(&request.user_content).to_string(),
            Purpose::Plan => format!(
                "[MOCK] A balanced plan would go here. Configure OPENAI_API_KEY for real plans.\n\nRequest: {}",
                request.user_content
            ),
            Purpose::Analyze => "[MOCK] 📊 Your recent logs look consistent. \
                 In production the model would summarize weight, nutrition and exercise trends."
                .to_string(),
            Purpose::Chat => format!(
                "[MOCK] Thanks for your message! In production I'd answer: \"{}\"",
                request.user_content
            ),
        };
        Ok(Some(output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(purpose: Purpose, content: &str) -> GenerationRequest {
        GenerationRequest {
            purpose,
            system_directive: String::new(),
            user_content: content.into(),
            temperature: 0.1,
            max_output_tokens: None,
            json_mode: purpose == Purpose::Extract,
        }
    }

    #[tokio::test]
    async fn test_mock_classification() {
        let adapter = MockAiAdapter::with_delay(0);
        let cases = [
            ("I ran 5km today", Intent::LogActivity),
            ("suggest a meal plan", Intent::PlanMeal),
            ("I need a workout plan", Intent::PlanWorkout),
            ("analyze my habits", Intent::AnalyzeHabits),
            ("hello there", Intent::Chat),
        ];
        for (text, expected) in cases {
            let prompt = format!("Intents: plan_meal analyze_habits\nMessage: {}", text);
            let label = adapter
                .complete(&request(Purpose::Classify, &prompt))
                .await
                .unwrap()
                .unwrap();
            assert_eq!(Intent::from_label(&label), expected, "text: {}", text);
        }
    }

    #[tokio::test]
    async fn test_mock_extraction() {
        let adapter = MockAiAdapter::with_delay(0);
        let raw = adapter
            .complete(&request(
                Purpose::Extract,
                "Example: 80kg\nMessage: I weighed 70kg, ate chicken salad and ran 5km",
            ))
            .await
            .unwrap()
            .unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        let entry = &value["activities"][0];
        assert_eq!(entry["weight"], "70kg");
        assert_eq!(entry["meal"], "chicken salad");
        assert_eq!(entry["workout"], "ran 5km");
    }

    #[test]
    fn test_meal_stops_at_next_activity() {
        for (text, meal) in [
            ("had oatmeal then ran 3km", "oatmeal"),
            ("I ate a big salad, went to the gym", "a big salad"),
            ("ate grilled salmon", "grilled salmon"),
        ] {
            let value = MockAiAdapter::extract(&format!("Message: {}", text));
            assert_eq!(value["activities"][0]["meal"], meal, "text: {}", text);
        }
    }

    #[tokio::test]
    async fn test_mock_extraction_nothing_found() {
        let adapter = MockAiAdapter::with_delay(0);
        let raw = adapter
            .complete(&request(Purpose::Extract, "hello"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(raw, r#"{"activities":[]}"#);
    }
}
