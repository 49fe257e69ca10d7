//! Infrastructure adapters. Implement outbound ports.
//!
//! Generation service, filesystem, LINE. Map errors to DomainError.

pub mod ai;
pub mod line;
pub mod persistence;
