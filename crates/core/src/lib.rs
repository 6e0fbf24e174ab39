//! Baggage reconciliation and alerting engine.
//!
//! The engine decides whether each passenger's bags are complete, finds
//! bags that went missing, turns flight timing plus bag state into
//! prioritised notifications, and persists those notifications without
//! re-alerting for a condition that is already reported.
//!
//! All durable state lives behind [`EntityStore`]; the engine itself keeps
//! nothing between calls and owns no background tasks.

pub mod services;

pub use services::*;
