//! Filesystem-backed adapters: prompt templates and activity history.

pub mod fs_templates;
pub mod jsonl_activity;
pub mod sample_activity;

pub use fs_templates::FsTemplateStore;
pub use jsonl_activity::JsonlActivityStore;
pub use sample_activity::SampleActivityStore;
