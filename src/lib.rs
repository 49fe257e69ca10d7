//! health-companion: LINE health assistant. Intent classification, LLM content
//! generation with graceful degradation, and a topic-based event pipeline, laid out
//! as a Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
