//! HTTP API for the baggage reconciliation engine.
//!
//! Exposes reconciliation passes, statistics, notification reads and scan
//! recording as JSON endpoints. Responses are wrapped as `{"data": ...}`;
//! errors use [`baggage_common::AppError`]'s response body.
//!
//! Built on Axum 0.8.

pub mod endpoints;
pub mod response;
pub mod state;

pub use endpoints::router;
pub use state::AppState;
