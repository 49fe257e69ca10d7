//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{
    ActivityLogEvent, ActivityRecord, DomainError, GenerationRequest, OutboundReply, TemplateId,
};

/// Generative text completion service (OpenAI-compatible or offline mock).
#[async_trait::async_trait]
pub trait GenerationPort: Send + Sync {
    /// Run one completion. `Ok(None)` means the service answered without content.
    ///
    /// # Errors
    /// `DomainError::Generation` carrying the upstream HTTP status and error code when known.
    async fn complete(&self, request: &GenerationRequest) -> Result<Option<String>, DomainError>;
}

/// Prompt template source.
#[async_trait::async_trait]
pub trait TemplatePort: Send + Sync {
    /// Load the raw template text.
    ///
    /// # Errors
    /// `DomainError::TemplateUnavailable` when the template cannot be read.
    async fn load(&self, id: TemplateId) -> Result<String, DomainError>;
}

/// Read side of the activity log: recent dated records for one user.
#[async_trait::async_trait]
pub trait ActivityStorePort: Send + Sync {
    /// Up to `limit` records, newest first. Unknown users yield an empty list.
    async fn recent_activity(
        &self,
        user_id: &str,
        limit: usize,
    ) -> Result<Vec<ActivityRecord>, DomainError>;
}

/// Log-ingestion sink for extracted activity entries.
#[async_trait::async_trait]
pub trait ActivityLogPort: Send + Sync {
    async fn record(&self, event: &ActivityLogEvent) -> Result<(), DomainError>;
}

/// Delivery of a finished reply to the messaging platform.
#[async_trait::async_trait]
pub trait ReplyPort: Send + Sync {
    async fn send_reply(&self, reply: &OutboundReply) -> Result<(), DomainError>;
}
