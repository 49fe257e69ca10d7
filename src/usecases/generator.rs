//! Common contract of the four content generators and the shared degrade-on-failure runner.

use crate::domain::{ActivityLogEvent, DomainError, GenerationJob, OutboundReply, PipelineStage};
use crate::domain::CallSite;
use crate::usecases::degradation::DegradationPolicy;
use tracing::{info, warn};

/// What a generator produced for one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub reply: String,
    /// Log-topic emissions. Only the activity extractor fills this.
    pub activity_logs: Vec<ActivityLogEvent>,
}

impl Generated {
    pub fn text(reply: String) -> Self {
        Self {
            reply,
            activity_logs: Vec::new(),
        }
    }
}

/// Text in, text out. Implementors differ only in directive, sampling and output parsing.
#[async_trait::async_trait]
pub trait Generator: Send + Sync {
    /// Identity used to pick fallback text for this job.
    fn call_site(&self, job: &GenerationJob) -> CallSite;

    async fn generate(&self, job: &GenerationJob) -> Result<Generated, DomainError>;
}

/// Terminal result of one generation stage. Always carries a non-empty reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    /// `Completed` or `Degraded`.
    pub stage: PipelineStage,
    pub reply: OutboundReply,
    pub activity_logs: Vec<ActivityLogEvent>,
}

/// Run `generator` on `job`, converting any failure into the policy's fallback text.
pub async fn run_generator(
    generator: &dyn Generator,
    policy: &DegradationPolicy,
    job: &GenerationJob,
) -> StepOutcome {
    let site = generator.call_site(job);
    let result = generator
        .generate(job)
        .await
        .and_then(|generated| {
            if generated.reply.trim().is_empty() {
                Err(DomainError::generation("generator produced an empty reply"))
            } else {
                Ok(generated)
            }
        });

    let (stage, message, activity_logs) = match result {
        Ok(generated) => (
            PipelineStage::Completed,
            generated.reply,
            generated.activity_logs,
        ),
        Err(e) => {
            warn!(
                user_id = %job.user_id,
                intent = %job.intent,
                call_site = %site,
                error = %e,
                "generation failed, using fallback"
            );
            (
                PipelineStage::Degraded,
                policy.resolve(site, &e, &job.message),
                Vec::new(),
            )
        }
    };

    info!(
        user_id = %job.user_id,
        call_site = %site,
        stage = %stage,
        reply_len = message.len(),
        logs = activity_logs.len(),
        "generation stage finished"
    );

    StepOutcome {
        stage,
        reply: OutboundReply {
            user_id: job.user_id.clone(),
            message,
            reply_token: job.reply_token.clone(),
        },
        activity_logs,
    }
}

/// Treat a missing or blank completion as absent.
pub(crate) fn non_blank(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.trim().is_empty())
}
