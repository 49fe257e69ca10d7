//! Application use cases. Orchestrate domain logic via ports.

pub mod activity_extractor;
pub mod chat;
pub mod classifier;
pub mod degradation;
pub mod generator;
pub mod habit_analyzer;
pub mod planner;
pub mod router;

#[cfg(test)]
pub(crate) mod test_support;

pub use activity_extractor::ActivityExtractor;
pub use chat::ChatResponder;
pub use classifier::IntentClassifier;
pub use degradation::DegradationPolicy;
pub use generator::{run_generator, Generated, Generator, StepOutcome};
pub use habit_analyzer::{HabitAnalyzer, DEFAULT_HISTORY_LIMIT};
pub use planner::Planner;
pub use router::{Event, EventPublisher, EventRouter, Generators, Topic};
