//! Error types for the plan request workflow

use thiserror::Error;

/// A required field was left empty. Never reaches the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// Anything that went wrong between sending the prompt and holding the text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    #[error("service unreachable: {0}")]
    NetworkUnavailable(String),

    #[error("service rejected the request with status {status}")]
    ServiceRejected { status: u16, body: String },

    #[error("unexpected response shape: {0}")]
    UnexpectedResponseShape(String),

    #[error("no API key configured (set GEMINI_API_KEY or api_key in the config file)")]
    MissingCredential,

    #[error("request task failed: {0}")]
    TaskFailed(String),
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL carries the API key in its query string
        let err = err.without_url();
        if err.is_decode() {
            RemoteError::UnexpectedResponseShape(err.to_string())
        } else {
            RemoteError::NetworkUnavailable(err.to_string())
        }
    }
}

/// Why a submission attempt did not produce a plan
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("a request is already in flight")]
    InFlight,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Remote(#[from] RemoteError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not determine config directory")]
    NoConfigDir,

    #[error("failed to access config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}
