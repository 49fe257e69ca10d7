//! Application configuration. Credentials, endpoints, paths.

use crate::domain::Locale;
use serde::Deserialize;
use std::path::PathBuf;

/// Default capacity of the event router queue. Publishers wait when it is full.
pub const DEFAULT_EVENT_QUEUE_SIZE: usize = 1024;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_AI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_AI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_LINE_REPLY_URL: &str = "https://api.line.me/v2/bot/message/reply";

/// Backing data for habit analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivityStoreKind {
    /// Per-user JSON-lines files under `<data_dir>/activity/`.
    #[default]
    Jsonl,
    /// Built-in placeholder records.
    Sample,
}

#[derive(Debug, Deserialize, Default)]
pub struct AppConfig {
    /// HTTP listen address for the webhook. Read from HEALTH_COMPANION_BIND_ADDR.
    #[serde(default)]
    pub bind_addr: Option<String>,

    /// Directory holding the `.mustache` prompt templates.
    #[serde(default)]
    pub prompts_dir: Option<String>,

    #[serde(default)]
    pub data_dir: Option<String>,

    /// Bounded queue size for the event router. Read from HEALTH_COMPANION_EVENT_QUEUE_SIZE.
    #[serde(default)]
    pub event_queue_size: Option<usize>,

    /// Records handed to the habit analyzer.
    #[serde(default)]
    pub history_limit: Option<usize>,

    #[serde(default)]
    pub activity_store: Option<ActivityStoreKind>,

    // ─────────────────────────────────────────────────────────────────────────
    // Generation
    // ─────────────────────────────────────────────────────────────────────────
    /// AI API key. Read from HEALTH_COMPANION_AI_API_KEY or OPENAI_API_KEY.
    #[serde(default)]
    pub ai_api_key: Option<String>,

    /// AI API URL. Defaults to OpenAI.
    #[serde(default)]
    pub ai_api_url: Option<String>,

    /// AI model name. Defaults to "gpt-4o-mini".
    #[serde(default)]
    pub ai_model: Option<String>,

    // ─────────────────────────────────────────────────────────────────────────
    // Fallback text
    // ─────────────────────────────────────────────────────────────────────────
    /// Locale of quota notices. Defaults to zh-TW.
    #[serde(default)]
    pub quota_locale: Option<Locale>,

    /// Locale of every other fallback. Defaults to en.
    #[serde(default)]
    pub fallback_locale: Option<Locale>,

    // ─────────────────────────────────────────────────────────────────────────
    // LINE
    // ─────────────────────────────────────────────────────────────────────────
    /// Channel access token. Read from HEALTH_COMPANION_LINE_CHANNEL_ACCESS_TOKEN or
    /// LINE_CHANNEL_ACCESS_TOKEN.
    #[serde(default)]
    pub line_channel_access_token: Option<String>,

    #[serde(default)]
    pub line_reply_url: Option<String>,
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenv::dotenv().ok();
        let mut c = config::Config::builder();
        c = c.add_source(config::Environment::with_prefix("HEALTH_COMPANION"));
        if let Ok(path) = std::env::var("HEALTH_COMPANION_CONFIG") {
            c = c.add_source(config::File::with_name(&path));
        }
        let mut cfg: Self = c.build()?.try_deserialize()?;
        // Platform-standard names are read directly so an existing .env works unchanged
        if cfg.ai_api_key.is_none() {
            cfg.ai_api_key = non_empty_env("OPENAI_API_KEY");
        }
        if cfg.line_channel_access_token.is_none() {
            cfg.line_channel_access_token = non_empty_env("LINE_CHANNEL_ACCESS_TOKEN");
        }
        Ok(cfg)
    }

    pub fn bind_addr_or_default(&self) -> String {
        self.bind_addr
            .clone()
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
    }

    pub fn prompts_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.prompts_dir.as_deref().unwrap_or("./prompts"))
    }

    pub fn data_dir_or_default(&self) -> PathBuf {
        PathBuf::from(self.data_dir.as_deref().unwrap_or("./data"))
    }

    /// Returns the router queue size. Zero is treated as unset.
    pub fn event_queue_size_or_default(&self) -> usize {
        self.event_queue_size
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_EVENT_QUEUE_SIZE)
    }

    pub fn activity_store_or_default(&self) -> ActivityStoreKind {
        self.activity_store.unwrap_or_default()
    }

    /// Returns the AI API key if configured and non-empty.
    pub fn ai_api_key(&self) -> Option<String> {
        self.ai_api_key.clone().filter(|k| !k.trim().is_empty())
    }

    pub fn ai_api_url_or_default(&self) -> String {
        self.ai_api_url
            .clone()
            .unwrap_or_else(|| DEFAULT_AI_API_URL.to_string())
    }

    pub fn ai_model_or_default(&self) -> String {
        self.ai_model
            .clone()
            .unwrap_or_else(|| DEFAULT_AI_MODEL.to_string())
    }

    /// Returns true if AI is configured (API key present).
    pub fn is_ai_configured(&self) -> bool {
        self.ai_api_key().is_some()
    }

    pub fn quota_locale_or_default(&self) -> Locale {
        self.quota_locale.unwrap_or(Locale::ZhTw)
    }

    pub fn fallback_locale_or_default(&self) -> Locale {
        self.fallback_locale.unwrap_or(Locale::En)
    }

    pub fn line_channel_access_token(&self) -> Option<String> {
        self.line_channel_access_token
            .clone()
            .filter(|t| !t.trim().is_empty())
    }

    pub fn line_reply_url_or_default(&self) -> String {
        self.line_reply_url
            .clone()
            .unwrap_or_else(|| DEFAULT_LINE_REPLY_URL.to_string())
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}
