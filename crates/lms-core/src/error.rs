use thiserror::Error;

#[derive(Debug, Error)]
pub enum LmsError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("invalid input file {path}: {reason}")]
    InputFormat { path: String, reason: String },

    #[error("invalid timestamp '{0}': expected RFC 3339 (2024-08-21T00:00:00-05:00) or a date (2024-08-21)")]
    InvalidTimestamp(String),

    #[error("remote service unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("remote service rejected {url} with status {status}: {body}")]
    RemoteRejected {
        status: u16,
        url: String,
        body: String,
    },

    #[error("malformed response from {url}: {reason}")]
    MalformedResponse { url: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl LmsError {
    pub fn input(path: impl AsRef<std::path::Path>, reason: impl Into<String>) -> Self {
        LmsError::InputFormat {
            path: path.as_ref().display().to_string(),
            reason: reason.into(),
        }
    }

    /// Errors raised at the remote-call boundary. These are isolated to the
    /// subject or record being processed and never abort a run.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            LmsError::RemoteUnavailable(_)
                | LmsError::RemoteRejected { .. }
                | LmsError::MalformedResponse { .. }
        )
    }
}

impl From<reqwest::Error> for LmsError {
    fn from(e: reqwest::Error) -> Self {
        LmsError::RemoteUnavailable(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LmsError>;
