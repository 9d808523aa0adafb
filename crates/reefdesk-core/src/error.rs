use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown view profile: {0}")]
    UnknownProfile(String),

    #[error("Invalid record schema: {0}")]
    InvalidSchema(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Failure to acquire a collection from the backend.
///
/// Never produced by the pipeline itself; only the collection source fails.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Transport failure for {endpoint}: {reason}")]
    Transport { endpoint: String, reason: String },

    #[error("Request to {endpoint} timed out")]
    Timeout { endpoint: String },

    #[error("{endpoint} answered with HTTP {status}")]
    Status { endpoint: String, status: u16 },

    #[error("Malformed JSON from {endpoint}: {reason}")]
    MalformedJson { endpoint: String, reason: String },

    #[error("Unexpected response shape from {endpoint}: {reason}")]
    UnexpectedShape { endpoint: String, reason: String },
}

impl FetchError {
    #[must_use]
    pub fn endpoint(&self) -> &str {
        match self {
            Self::Transport { endpoint, .. }
            | Self::Timeout { endpoint }
            | Self::Status { endpoint, .. }
            | Self::MalformedJson { endpoint, .. }
            | Self::UnexpectedShape { endpoint, .. } => endpoint,
        }
    }
}
