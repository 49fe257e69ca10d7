//! Topic-based event router.
//!
//! Each pipeline step is a handler from one event to its follow-up events. The
//! dispatch loop drains a bounded queue and runs every event on its own task, so a
//! slow generation never blocks classification of the next message.

use crate::domain::{
    ActivityLogEvent, DomainError, GenerationJob, InboundMessage, Intent, OutboundReply,
    PipelineStage,
};
use crate::ports::{
    ActivityLogPort, ActivityStorePort, GenerationPort, InboundPort, ReplyPort, TemplatePort,
};
use crate::usecases::activity_extractor::ActivityExtractor;
use crate::usecases::chat::ChatResponder;
use crate::usecases::classifier::IntentClassifier;
use crate::usecases::degradation::DegradationPolicy;
use crate::usecases::generator::{run_generator, Generator};
use crate::usecases::habit_analyzer::HabitAnalyzer;
use crate::usecases::planner::Planner;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

/// Named channels events travel on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    MessageReceived,
    PlannerRequest,
    ActivityExtract,
    AnalyzeHabits,
    HealthChat,
    ActivityLog,
    SendLineMessage,
}

impl Topic {
    pub fn as_str(self) -> &'static str {
        match self {
            Topic::MessageReceived => "message-received",
            Topic::PlannerRequest => "planner-request",
            Topic::ActivityExtract => "user-activity-extract",
            Topic::AnalyzeHabits => "analyze-user-habits",
            Topic::HealthChat => "health-chat-message",
            Topic::ActivityLog => "user-activity-log",
            Topic::SendLineMessage => "send-line-message-request",
        }
    }

    /// Topic a generation job for `intent` is published on.
    pub fn for_intent(intent: Intent) -> Topic {
        match intent {
            Intent::PlanMeal | Intent::PlanWorkout => Topic::PlannerRequest,
            Intent::LogActivity => Topic::ActivityExtract,
            Intent::AnalyzeHabits => Topic::AnalyzeHabits,
            Intent::Chat => Topic::HealthChat,
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed payloads carried by the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    MessageReceived(InboundMessage),
    GenerationRequested(GenerationJob),
    /// One batch's log records, recorded in batch order.
    ActivityLogged(Vec<ActivityLogEvent>),
    ReplyReady(OutboundReply),
}

impl Event {
    pub fn topic(&self) -> Topic {
        match self {
            Event::MessageReceived(_) => Topic::MessageReceived,
            Event::GenerationRequested(job) => Topic::for_intent(job.intent),
            Event::ActivityLogged(_) => Topic::ActivityLog,
            Event::ReplyReady(_) => Topic::SendLineMessage,
        }
    }
}

/// The four generators, one per routable topic.
pub struct Generators {
    pub planner: Arc<dyn Generator>,
    pub extractor: Arc<dyn Generator>,
    pub analyzer: Arc<dyn Generator>,
    pub chat: Arc<dyn Generator>,
}

impl Generators {
    /// Standard wiring over shared ports.
    pub fn new(
        ai: Arc<dyn GenerationPort>,
        templates: Arc<dyn TemplatePort>,
        store: Arc<dyn ActivityStorePort>,
        history_limit: usize,
    ) -> Self {
        Self {
            planner: Arc::new(Planner::new(Arc::clone(&ai))),
            extractor: Arc::new(ActivityExtractor::new(
                Arc::clone(&ai),
                Arc::clone(&templates),
            )),
            analyzer: Arc::new(
                HabitAnalyzer::new(Arc::clone(&ai), templates, store)
                    .with_history_limit(history_limit),
            ),
            chat: Arc::new(ChatResponder::new(ai)),
        }
    }

    pub fn for_intent(&self, intent: Intent) -> &dyn Generator {
        match intent {
            Intent::PlanMeal | Intent::PlanWorkout => self.planner.as_ref(),
            Intent::LogActivity => self.extractor.as_ref(),
            Intent::AnalyzeHabits => self.analyzer.as_ref(),
            Intent::Chat => self.chat.as_ref(),
        }
    }
}

pub struct EventRouter {
    classifier: IntentClassifier,
    generators: Generators,
    policy: DegradationPolicy,
    replies: Arc<dyn ReplyPort>,
    activity_log: Arc<dyn ActivityLogPort>,
}

impl EventRouter {
    pub fn new(
        classifier: IntentClassifier,
        generators: Generators,
        policy: DegradationPolicy,
        replies: Arc<dyn ReplyPort>,
        activity_log: Arc<dyn ActivityLogPort>,
    ) -> Self {
        Self {
            classifier,
            generators,
            policy,
            replies,
            activity_log,
        }
    }

    /// Handle one event and return the events it produces.
    pub async fn handle(&self, event: Event) -> Vec<Event> {
        let topic = event.topic();
        debug!(topic = %topic, "event received");

        match event {
            Event::MessageReceived(message) => self.on_message(message).await,
            Event::GenerationRequested(job) => {
                info!(
                    user_id = %job.user_id,
                    topic = %topic,
                    stage = %PipelineStage::Generating,
                    "generation started"
                );
                let outcome =
                    run_generator(self.generators.for_intent(job.intent), &self.policy, &job).await;
                let mut follow_ups = Vec::with_capacity(2);
                if !outcome.activity_logs.is_empty() {
                    follow_ups.push(Event::ActivityLogged(outcome.activity_logs));
                }
                follow_ups.push(Event::ReplyReady(outcome.reply));
                follow_ups
            }
            Event::ActivityLogged(logs) => {
                for log in &logs {
                    if let Err(e) = self.activity_log.record(log).await {
                        error!(user_id = %log.user_id, error = %e, "failed to record activity");
                    }
                }
                Vec::new()
            }
            Event::ReplyReady(reply) => {
                if let Err(e) = self.replies.send_reply(&reply).await {
                    error!(user_id = %reply.user_id, error = %e, "failed to deliver reply");
                } else {
                    debug!(user_id = %reply.user_id, "reply delivered");
                }
                Vec::new()
            }
        }
    }

    async fn on_message(&self, message: InboundMessage) -> Vec<Event> {
        info!(
            user_id = %message.user_id,
            kind = message.body.kind(),
            stage = %PipelineStage::Received,
            "message received"
        );
        let Some(text) = message.text() else {
            info!(
                user_id = %message.user_id,
                kind = message.body.kind(),
                "unsupported message type, dropping"
            );
            return Vec::new();
        };

        let intent = self.classifier.classify(text).await;
        info!(
            user_id = %message.user_id,
            intent = %intent,
            stage = %PipelineStage::Classified,
            "message classified"
        );

        let job_message = match intent {
            Intent::AnalyzeHabits => String::new(),
            _ => text.to_string(),
        };
        vec![Event::GenerationRequested(GenerationJob {
            user_id: message.user_id.clone(),
            reply_token: message.reply_token.clone(),
            intent,
            message: job_message,
        })]
    }

    /// Start the dispatch loop on a queue of `capacity` events.
    pub fn spawn(self, capacity: usize) -> EventPublisher {
        let (tx, mut rx) = mpsc::channel(capacity.max(1));
        let publisher = EventPublisher { tx };
        let loop_publisher = publisher.clone();
        let router = Arc::new(self);

        tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                let router = Arc::clone(&router);
                let publisher = loop_publisher.clone();
                tokio::spawn(async move {
                    for follow_up in router.handle(event).await {
                        let topic = follow_up.topic();
                        if let Err(e) = publisher.publish(follow_up).await {
                            error!(topic = %topic, error = %e, "failed to publish follow-up event");
                        }
                    }
                });
            }
            info!("event router stopped (queue closed)");
        });

        publisher
    }
}

/// Cloneable handle for publishing onto the router's queue.
#[derive(Clone)]
pub struct EventPublisher {
    tx: mpsc::Sender<Event>,
}

impl EventPublisher {
    pub async fn publish(&self, event: Event) -> Result<(), DomainError> {
        self.tx
            .send(event)
            .await
            .map_err(|e| DomainError::EventBus(format!("queue closed: {}", e)))
    }
}

#[async_trait::async_trait]
impl InboundPort for EventPublisher {
    async fn accept(&self, message: InboundMessage) -> Result<(), DomainError> {
        self.publish(Event::MessageReceived(message)).await
    }
}
