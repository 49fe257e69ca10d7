//! Domain entities. Pure data structures for the core business.
//!
//! No LINE/HTTP types here; adapters map into these.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where an inbound message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    User,
    Group,
    Room,
}

/// Body of an inbound message. Only text reaches classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageBody {
    Text { text: String },
    Image { id: String },
    /// Any modality the edge accepts but the pipeline does not handle (sticker, audio, ...).
    Unsupported { kind: String },
}

impl MessageBody {
    pub fn kind(&self) -> &str {
        match self {
            MessageBody::Text { .. } => "text",
            MessageBody::Image { .. } => "image",
            MessageBody::Unsupported { kind } => kind,
        }
    }
}

/// A normalized chat-platform message. Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub user_id: String,
    pub source_type: SourceType,
    pub reply_token: String,
    /// Milliseconds since epoch, as delivered by the platform.
    pub timestamp: i64,
    pub body: MessageBody,
}

impl InboundMessage {
    /// Returns the text when this is a non-empty text message.
    pub fn text(&self) -> Option<&str> {
        match &self.body {
            MessageBody::Text { text } if !text.is_empty() => Some(text),
            _ => None,
        }
    }
}

/// Closed set of intents. `Chat` is the universal default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    PlanMeal,
    PlanWorkout,
    LogActivity,
    AnalyzeHabits,
    Chat,
}

impl Intent {
    /// Labels offered to the classifier model. `chat` is implied as the default.
    pub const ROUTABLE: [Intent; 4] = [
        Intent::PlanMeal,
        Intent::PlanWorkout,
        Intent::LogActivity,
        Intent::AnalyzeHabits,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Intent::PlanMeal => "plan_meal",
            Intent::PlanWorkout => "plan_workout",
            Intent::LogActivity => "log_activity",
            Intent::AnalyzeHabits => "analyze_habits",
            Intent::Chat => "chat",
        }
    }

    /// Maps a raw model label onto the closed set. Anything unrecognized is `Chat`.
    ///
    /// Tolerates surrounding whitespace, quotes, backticks, a trailing period and
    /// upper case, which small models emit even when told not to.
    pub fn from_label(raw: &str) -> Intent {
        let cleaned = raw
            .trim()
            .trim_matches(|c: char| c == '"' || c == '\'' || c == '`' || c == '.')
            .trim()
            .to_ascii_lowercase();
        match cleaned.as_str() {
            "plan_meal" => Intent::PlanMeal,
            "plan_workout" => Intent::PlanWorkout,
            "log_activity" => Intent::LogActivity,
            "analyze_habits" => Intent::AnalyzeHabits,
            _ => Intent::Chat,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One extracted activity. Every field is optional; an all-empty entry is still valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout: Option<String>,
}

impl ActivityEntry {
    pub fn is_empty(&self) -> bool {
        self.weight.is_none() && self.meal.is_none() && self.workout.is_none()
    }
}

/// Validated, non-empty batch of entries extracted from one message.
#[allow(clippy::len_without_is_empty)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityBatch {
    entries: Vec<ActivityEntry>,
}

impl ActivityBatch {
    /// Returns `None` for an empty list; a batch always holds at least one entry.
    pub fn new(entries: Vec<ActivityEntry>) -> Option<Self> {
        if entries.is_empty() {
            None
        } else {
            Some(Self { entries })
        }
    }

    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn into_entries(self) -> Vec<ActivityEntry> {
        self.entries
    }
}

/// Record emitted to the log-ingestion topic, one per extracted entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEvent {
    pub user_id: String,
    pub reply_token: String,
    #[serde(flatten)]
    pub entry: ActivityEntry,
}

/// A dated activity record as read back from an activity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// `YYYY-MM-DD`.
    pub date: String,
    #[serde(flatten)]
    pub entry: ActivityEntry,
}

/// Reply handed to the delivery boundary. `message` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundReply {
    pub user_id: String,
    pub message: String,
    pub reply_token: String,
}

/// A unit of generation work routed to one generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationJob {
    pub user_id: String,
    pub reply_token: String,
    pub intent: Intent,
    /// User's original text. Empty for habit analysis, which reads the activity store.
    pub message: String,
}

/// Stages of one message's trip through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Classified,
    Generating,
    Completed,
    Degraded,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PipelineStage::Received => "received",
            PipelineStage::Classified => "classified",
            PipelineStage::Generating => "generating",
            PipelineStage::Completed => "completed",
            PipelineStage::Degraded => "degraded",
        };
        f.write_str(s)
    }
}

/// Prompt templates the pipeline knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TemplateId {
    ClassifyIntent,
    ExtractActivity,
    AnalyzeHealth,
}

impl TemplateId {
    pub fn file_name(self) -> &'static str {
        match self {
            TemplateId::ClassifyIntent => "classify-intent.mustache",
            TemplateId::ExtractActivity => "user-activity-extract.mustache",
            TemplateId::AnalyzeHealth => "analyze-health.mustache",
        }
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

/// Why a generation request is made. Used for logging and by the offline adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Purpose {
    Classify,
    Plan,
    Analyze,
    Extract,
    Chat,
}

/// A single completion request against the generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub purpose: Purpose,
    pub system_directive: String,
    pub user_content: String,
    pub temperature: f32,
    /// `None` leaves the budget to the service.
    pub max_output_tokens: Option<u32>,
    pub json_mode: bool,
}

/// Which generator is degrading. Each has its own fallback content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallSite {
    MealPlan,
    WorkoutPlan,
    HabitAnalysis,
    ActivityLog,
    Chat,
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CallSite::MealPlan => "meal_plan",
            CallSite::WorkoutPlan => "workout_plan",
            CallSite::HabitAnalysis => "habit_analysis",
            CallSite::ActivityLog => "activity_log",
            CallSite::Chat => "chat",
        };
        f.write_str(s)
    }
}

/// Language of fallback text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Locale {
    #[serde(rename = "en")]
    En,
    #[serde(rename = "zh-TW", alias = "zh-tw", alias = "zh_TW")]
    ZhTw,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "en" => Ok(Locale::En),
            "zh-tw" => Ok(Locale::ZhTw),
            other => Err(format!("unsupported locale '{}'", other)),
        }
    }
}
