//! # Error Types
//!
//! Two families of errors live here:
//!
//! - [`ErrorKind`] is the coarse classification carried by a rejected
//!   [`Task`](crate::task::Task). It is a value, not an exception: it travels
//!   through joins and requirement boundaries and is what callers of the
//!   entry point ultimately observe.
//! - [`LoaderError`] covers operational failures that are not task outcomes
//!   (configuration, misuse of the promise cache).

use serde::{Deserialize, Serialize};

/// Rejection payload of a task.
///
/// The display string is the user-facing message; [`ErrorKind::code`] gives
/// the short stable identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    #[error("No reference name or script URL was passed.")]
    NoValue,

    #[error("The requested script is not in the reference table.")]
    NoRef,

    #[error("A required dependency is not in the reference table.")]
    NoRequirement,

    #[error("A required dependency failed to load.")]
    BadRequirement,

    #[error("The requested script failed to load.")]
    BadResource,

    #[error("An unknown error has occurred.")]
    Unknown,
}

impl ErrorKind {
    /// Every kind, in declaration order
    pub const ALL: [ErrorKind; 6] = [
        ErrorKind::NoValue,
        ErrorKind::NoRef,
        ErrorKind::NoRequirement,
        ErrorKind::BadRequirement,
        ErrorKind::BadResource,
        ErrorKind::Unknown,
    ];

    /// Short code used in logs and by [`crate::Loader::errs`]
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::NoValue => "noval",
            ErrorKind::NoRef => "noref",
            ErrorKind::NoRequirement => "noreq",
            ErrorKind::BadRequirement => "badreq",
            ErrorKind::BadResource => "badres",
            ErrorKind::Unknown => "unknown",
        }
    }

    /// Look a kind up by its short code
    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.code() == code)
    }

    /// Human-readable description of the failure
    pub fn message(self) -> String {
        self.to_string()
    }
}

/// Operational errors raised by the loader outside of task settlement
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    #[error("Key '{key}' already has a task in the promise cache")]
    AlreadyReserved { key: String },

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Invalid value for {variable}: {reason}")]
    InvalidEnvironment { variable: String, reason: String },
}

impl From<config::ConfigError> for LoaderError {
    fn from(error: config::ConfigError) -> Self {
        LoaderError::ConfigurationError(error.to_string())
    }
}

impl From<serde_json::Error> for LoaderError {
    fn from(error: serde_json::Error) -> Self {
        LoaderError::ConfigurationError(format!("JSON error: {error}"))
    }
}

pub type Result<T> = std::result::Result<T, LoaderError>;
