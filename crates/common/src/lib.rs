//! Common utilities and shared types for the baggage reconciliation engine.
//!
//! This crate provides foundational components used across all workspace crates:
//!
//! - **Configuration**: Application and engine settings via [`Config`]
//! - **Error handling**: Unified error taxonomy via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//!
//! # Example
//!
//! ```no_run
//! use baggage_common::{AppResult, Config, IdGenerator};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     println!("{} every {}s", id_gen.generate(), config.scheduler.pass_interval_secs);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;

pub use config::{Config, ReconciliationConfig, SchedulerConfig};
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
