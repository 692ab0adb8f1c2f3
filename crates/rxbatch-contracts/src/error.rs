//! Error types for rxbatch.
//!
//! All fallible operations return `RxResult<T>`. Only `SourceUnreadable`,
//! `AuthenticationFailed`, `DriverUnavailable`, `ConfigError` and
//! `InputError` end a run; the pipeline turns every other variant into a
//! per-patient `Failed` outcome.

use std::path::PathBuf;

use thiserror::Error;

/// The unified error type for rxbatch.
#[derive(Debug, Error)]
pub enum RxError {
    /// A spreadsheet could not be opened or read as tabular data.
    #[error("cannot read '{}': {reason}", path.display())]
    SourceUnreadable { path: PathBuf, reason: String },

    /// After submitting credentials the remote application stayed on its login surface.
    #[error("authentication failed: still on login page '{location}'")]
    AuthenticationFailed { location: String },

    /// No browser session could be created.
    #[error("remote driver unavailable: {reason}")]
    DriverUnavailable { reason: String },

    /// The "generated" signal did not arrive within the configured bound.
    #[error("prescription was not generated within {waited_ms} ms")]
    GenerationTimeout { waited_ms: u64 },

    /// Any failure while interacting with the remote application.
    #[error("remote interaction failed: {reason}")]
    RemoteInteraction { reason: String },

    /// A record lacks a field the current step needs.
    #[error("row {row}: missing field '{field}'")]
    MissingField { row: usize, field: String },

    /// A configuration value is missing or invalid.
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    /// Reading from the console failed.
    #[error("input error: {reason}")]
    InputError { reason: String },

    /// The run report could not be written.
    #[error("report write failed: {reason}")]
    ReportWrite { reason: String },
}

impl RxError {
    /// Shorthand for a `RemoteInteraction` error.
    pub fn remote(reason: impl Into<String>) -> Self {
        RxError::RemoteInteraction {
            reason: reason.into(),
        }
    }

    /// True for the kinds that abort the whole run.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RxError::SourceUnreadable { .. }
                | RxError::AuthenticationFailed { .. }
                | RxError::DriverUnavailable { .. }
                | RxError::ConfigError { .. }
                | RxError::InputError { .. }
        )
    }
}

/// Convenience alias used throughout the rxbatch crates.
pub type RxResult<T> = Result<T, RxError>;
