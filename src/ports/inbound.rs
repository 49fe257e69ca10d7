//! Inbound port. The webhook (adapter) hands normalized messages to the application.

use crate::domain::{DomainError, InboundMessage};

/// Entry point of the pipeline. Implemented by the event router's publisher.
#[async_trait::async_trait]
pub trait InboundPort: Send + Sync {
    /// Queue one message for processing. Returns once it is accepted, not once it is answered.
    async fn accept(&self, message: InboundMessage) -> Result<(), DomainError>;
}
