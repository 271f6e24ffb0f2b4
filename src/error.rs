//! Error types for uiwright.

use std::time::Duration;

/// Result type alias using UiwrightError.
pub type Result<T> = std::result::Result<T, UiwrightError>;

/// Errors that can occur when using uiwright.
///
/// These cover infrastructure problems (driver transport, parsing, rendering).
/// Failed assertions inside a chain are never returned as errors; they are
/// recorded in the session [`Report`](crate::report::Report) instead.
#[derive(Debug, thiserror::Error)]
pub enum UiwrightError {
    /// The driver could not talk to the application under test.
    #[error("Driver error: {0}")]
    Driver(String),

    /// Timeout waiting for a condition.
    #[error("Timeout after {timeout:?} waiting for: {condition}")]
    Timeout {
        /// The condition that was being waited for.
        condition: String,
        /// How long we waited.
        timeout: Duration,
    },

    /// The DSL was used in a way it does not support.
    #[error("Usage error: {0}")]
    Usage(String),

    /// A textual element query could not be parsed.
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    /// File or stream I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization error.
    #[error("YAML error: {0}")]
    Yaml(String),

    /// Regex compilation error.
    #[error("Invalid regex: {0}")]
    Regex(#[from] regex::Error),

    /// Image rendering error.
    #[error("Image error: {0}")]
    Image(String),

    /// Font loading error.
    #[error("Font error: {0}")]
    Font(String),

    /// Invalid configuration.
    #[error("Config error: {0}")]
    Config(String),

    /// One or more strict assertions failed during the session.
    #[error("{count} assertion(s) failed:\n{summary}")]
    AssertionsFailed {
        /// Number of recorded failures.
        count: usize,
        /// One line per failure.
        summary: String,
    },
}
