//! Error types for bugfix-profiler

use thiserror::Error;

/// Errors raised while submitting, persisting or rendering a job
#[derive(Debug, Error)]
pub enum Error {
    /// A required bug report field is empty
    #[error("{0}")]
    Validation(String),

    /// The request never produced a response
    #[error("failed to reach the job processor: {0}")]
    Transport(String),

    /// The processor answered with a non-success status
    #[error("job processor rejected the report ({status}): {message}")]
    RemoteRejected {
        /// HTTP status code
        status: u16,
        /// Human-readable detail from the response body
        message: String,
    },

    /// A success response whose body is not a job result
    #[error("could not parse job processor response: {0}")]
    ResponseParse(String),

    /// No job result is stored for this session
    #[error("no bug data found, please resubmit")]
    MissingResult,

    /// The stored job result could not be read
    #[error("invalid bug data, please resubmit: {0}")]
    MalformedResult(String),

    /// Another submission from the same view has not resolved yet
    #[error("a submission is already in progress")]
    SubmissionInFlight,

    /// Operation not allowed in the current view
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// Session store failure
    #[error("session store error: {0}")]
    Store(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

/// Result type alias for bugfix-profiler operations
pub type Result<T> = std::result::Result<T, Error>;
