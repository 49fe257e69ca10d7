//! In-memory port fakes shared by the use-case tests.

use crate::domain::{
    ActivityLogEvent, ActivityRecord, DomainError, GenerationRequest, OutboundReply, TemplateId,
};
use crate::ports::{ActivityLogPort, ActivityStorePort, GenerationPort, ReplyPort, TemplatePort};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Replays queued responses in order and records every request.
#[derive(Default)]
pub struct ScriptedAi {
    responses: Mutex<VecDeque<Result<Option<String>, DomainError>>>,
    pub requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedAi {
    pub fn new(responses: Vec<Result<Option<String>, DomainError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn text(reply: &str) -> Self {
        Self::new(vec![Ok(Some(reply.to_string()))])
    }

    pub fn failing(err: DomainError) -> Self {
        Self::new(vec![Err(err)])
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl GenerationPort for ScriptedAi {
    async fn complete(&self, request: &GenerationRequest) -> Result<Option<String>, DomainError> {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(DomainError::generation("script exhausted")))
    }
}

pub fn quota_error() -> DomainError {
    DomainError::Generation {
        status: Some(429),
        code: Some("insufficient_quota".into()),
        message: "You exceeded your current quota".into(),
    }
}

/// Templates served from memory; absent ids are unavailable.
#[derive(Default)]
pub struct MemoryTemplates(pub HashMap<TemplateId, String>);

impl MemoryTemplates {
    pub fn with(id: TemplateId, body: &str) -> Self {
        let mut map = HashMap::new();
        map.insert(id, body.to_string());
        Self(map)
    }

    pub fn all() -> Self {
        let mut map = HashMap::new();
        map.insert(
            TemplateId::ClassifyIntent,
            "Intents: {{#intents}}{{.}} {{/intents}}\nMessage: {{message}}".to_string(),
        );
        map.insert(
            TemplateId::ExtractActivity,
            "Extract from: {{message}}".to_string(),
        );
        map.insert(
            TemplateId::AnalyzeHealth,
            "{{#logs}}{{date}} {{weight}} {{meal}} {{workout}}\n{{/logs}}{{^logs}}no logs{{/logs}}"
                .to_string(),
        );
        Self(map)
    }
}

#[async_trait::async_trait]
impl TemplatePort for MemoryTemplates {
    async fn load(&self, id: TemplateId) -> Result<String, DomainError> {
        self.0
            .get(&id)
            .cloned()
            .ok_or_else(|| DomainError::TemplateUnavailable {
                template: id.to_string(),
                reason: "not found".into(),
            })
    }
}

/// Fixed activity records, or a failure.
pub struct FixedStore(pub Result<Vec<ActivityRecord>, DomainError>);

#[async_trait::async_trait]
impl ActivityStorePort for FixedStore {
    async fn recent_activity(
        &self,
        _user_id: &str,
        limit: usize,
    ) -> Result<Vec<ActivityRecord>, DomainError> {
        self.0
            .clone()
            .map(|records| records.into_iter().take(limit).collect())
    }
}

/// Forwards every delivered reply / log event into channels the test can await.
pub struct Recorder {
    replies: mpsc::UnboundedSender<OutboundReply>,
    logs: mpsc::UnboundedSender<ActivityLogEvent>,
}

pub struct Recorded {
    pub replies: mpsc::UnboundedReceiver<OutboundReply>,
    pub logs: mpsc::UnboundedReceiver<ActivityLogEvent>,
}

impl Recorder {
    pub fn new() -> (Self, Recorded) {
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        let (log_tx, log_rx) = mpsc::unbounded_channel();
        (
            Self {
                replies: reply_tx,
                logs: log_tx,
            },
            Recorded {
                replies: reply_rx,
                logs: log_rx,
            },
        )
    }
}

#[async_trait::async_trait]
impl ReplyPort for Recorder {
    async fn send_reply(&self, reply: &OutboundReply) -> Result<(), DomainError> {
        self.replies
            .send(reply.clone())
            .map_err(|e| DomainError::Delivery(e.to_string()))
    }
}

#[async_trait::async_trait]
impl ActivityLogPort for Recorder {
    async fn record(&self, event: &ActivityLogEvent) -> Result<(), DomainError> {
        self.logs
            .send(event.clone())
            .map_err(|e| DomainError::ActivityStore(e.to_string()))
    }
}
