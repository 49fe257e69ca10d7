//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Template '{template}' unavailable: {reason}")]
    TemplateUnavailable { template: String, reason: String },

    /// Upstream generation call failed. `status` is the HTTP status when one was received;
    /// `code` is the provider's error code (e.g. `insufficient_quota`).
    #[error("Generation failed (status {status:?}, code {code:?}): {message}")]
    Generation {
        status: Option<u16>,
        code: Option<String>,
        message: String,
    },

    #[error("Extraction output failed validation: {0}")]
    ExtractionSchema(String),

    #[error("Activity store error: {0}")]
    ActivityStore(String),

    #[error("Reply delivery failed: {0}")]
    Delivery(String),

    #[error("Event bus error: {0}")]
    EventBus(String),

    #[error("Webhook payload rejected: {0}")]
    Webhook(String),
}

impl DomainError {
    /// Shorthand for a generation failure without status or code (transport, parse).
    pub fn generation(message: impl Into<String>) -> Self {
        DomainError::Generation {
            status: None,
            code: None,
            message: message.into(),
        }
    }
}

/// Upstream failure tag consumed by the degradation policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationFailure {
    QuotaExceeded {
        status: Option<u16>,
        code: Option<String>,
    },
    Other {
        status: Option<u16>,
        code: Option<String>,
    },
}

/// Status the provider uses for rate limiting and exhausted credit.
const QUOTA_STATUS: u16 = 429;
const QUOTA_CODE: &str = "insufficient_quota";

impl GenerationFailure {
    /// Tags any pipeline error. Only a generation error can be `QuotaExceeded`.
    pub fn classify(err: &DomainError) -> Self {
        match err {
            DomainError::Generation { status, code, .. } => {
                let quota =
                    *status == Some(QUOTA_STATUS) || code.as_deref() == Some(QUOTA_CODE);
                if quota {
                    GenerationFailure::QuotaExceeded {
                        status: *status,
                        code: code.clone(),
                    }
                } else {
                    GenerationFailure::Other {
                        status: *status,
                        code: code.clone(),
                    }
                }
            }
            _ => GenerationFailure::Other {
                status: None,
                code: None,
            },
        }
    }

    pub fn is_quota(&self) -> bool {
        matches!(self, GenerationFailure::QuotaExceeded { .. })
    }
}
