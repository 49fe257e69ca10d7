//! LINE Messaging API edges: inbound webhook (axum) and reply delivery (reqwest).

pub mod reply_client;
pub mod webhook;

pub use reply_client::LineReplyAdapter;
pub use webhook::build_router;
