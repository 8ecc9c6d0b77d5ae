use std::io;
use thiserror::Error;

// Import module-level errors for AppError
use crate::config::settings::ConfigError;
use crate::sim::command::CommandError;
use crate::template::document::TemplateError;

/// Unrecoverable engine faults.
///
/// Recoverable failures (bad arguments, invariant-violating transitions like a
/// commit on a protected branch) never surface here; they are folded into the
/// failed command's transcript. An `EngineError` means the simulation itself
/// is broken and the current scenario cannot continue.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("internal invariant violation: {0}")]
    InvariantViolation(String),
}

/// Top-level application error that wraps all module-specific errors
///
/// This provides a unified error type for application-level code while preserving
/// the specific error context from each module. All module errors automatically
/// convert to AppError via the `From` trait.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for engine transitions
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Result type for application-level operations
pub type AppResult<T> = std::result::Result<T, AppError>;
