//! Error types for the repo-reviver gateway.

use std::time::Duration;
use thiserror::Error;

/// Top-level error type for gateway operations.
///
/// Nothing outside the gateway boundary ever sees one of these directly;
/// they are folded into an [`OperationResult`](crate::outcome::OperationResult)
/// before being handed back to the agent.
#[derive(Error, Debug)]
pub enum Error {
    /// An external process exited with a non-zero status.
    ///
    /// The diagnostic is the process's stderr verbatim (or a fixed fallback
    /// when stderr was empty).
    #[error("{diagnostic}")]
    CommandFailed {
        diagnostic: String,
        output: Option<String>,
    },

    /// An in-sandbox command ran past its wall-clock budget.
    #[error("Command timed out after {}", format_budget(.0))]
    Timeout(Duration),

    /// The external program could not be started.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error while touching the working copy.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Structured output could not be decoded.
    #[error("{0}")]
    Json(#[from] serde_json::Error),

    /// The process succeeded but its output could not be interpreted.
    #[error("{0}")]
    MalformedOutput(String),

    /// A tool call carried arguments that do not fit the operation.
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, Error>;

fn format_budget(budget: &Duration) -> String {
    let secs = budget.as_secs();
    match secs {
        60 => "1 minute".to_string(),
        s if s > 0 && s % 60 == 0 => format!("{} minutes", s / 60),
        1 => "1 second".to_string(),
        s if s > 0 => format!("{} seconds", s),
        _ => format!("{} ms", budget.as_millis()),
    }
}
