//! Core domain layer. No external I/O dependencies.
//!
//! Entities, failure tagging and prompt rendering live here. Dependencies flow inward.

pub mod entities;
pub mod errors;
pub mod template;

pub use entities::{
    ActivityBatch, ActivityEntry, ActivityLogEvent, ActivityRecord, CallSite, GenerationJob,
    GenerationRequest, InboundMessage, Intent, Locale, MessageBody, OutboundReply, PipelineStage,
    Purpose, SourceType, TemplateId,
};
pub use errors::{DomainError, GenerationFailure};
pub use template::render;
