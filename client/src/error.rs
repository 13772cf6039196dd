use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a remote call. Surfaced as-is to callers; never retried here.
#[derive(Debug, Error)]
pub enum RemoteOperationError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("remote returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl RemoteOperationError {
    /// HTTP status of the failed call, when the remote answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status(),
            Self::Decode(_) => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}
