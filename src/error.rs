use std::error::Error as StdError;

use thiserror::Error;

/// Crate-wide result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Value stored in `Record.error` when a URL yields no video id.
pub const INVALID_URL: &str = "INVALID_URL";

/// Crate-wide error type.
///
/// This is intentionally decoupled from `anyhow` so downstream libraries aren't forced to
/// adopt `anyhow` in their own public APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// No video id could be derived from the given input.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A segment lacks data that the selected caption format requires.
    #[error("segment {index} is missing required field `{field}`")]
    MissingField { index: usize, field: &'static str },

    /// A caption format name outside the closed set of formats.
    #[error("unsupported caption format: {0}")]
    UnsupportedFormat(String),

    /// An export selection name outside `json`, `csv`, `ndjson`, `all`.
    #[error("unsupported export selection: {0}")]
    UnsupportedExport(String),

    /// The caption or metadata provider failed for a single video.
    #[error("{0}")]
    ProviderFailure(String),

    #[error("{0}")]
    Message(String),

    #[error(transparent)]
    Other(#[from] Box<dyn StdError + Send + Sync>),
}

impl Error {
    pub(crate) fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    pub(crate) fn provider(message: impl Into<String>) -> Self {
        Self::ProviderFailure(message.into())
    }

    /// The string written into a record's `error` field for this failure.
    pub fn record_code(&self) -> String {
        match self {
            Self::InvalidInput(_) => INVALID_URL.to_owned(),
            other => other.to_string(),
        }
    }

    /// Whether this error invalidates the whole run rather than a single video.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::UnsupportedFormat(_) | Self::UnsupportedExport(_))
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Message(format!("{err:#}"))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Other(Box::new(err))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Other(Box::new(err))
    }
}
