//! Domain layer - core types shared by the store, the session and the CLI.
//!
//! This layer contains plain models, configuration and error types
//! without any I/O of its own.

pub mod config;
pub mod error;
pub mod models;

pub use config::{AppConfig, StateConfig, TailConfig, DEFAULT_STATE_FILE};
pub use error::{AppError, Result};
pub use models::{CursorStatus, TailOutcome, TailSummary};
