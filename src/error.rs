use thiserror::Error;

/// Every failure a client operation can surface.
///
/// Components translate these into the one-line messages shown to the user;
/// none of them is retried automatically.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Caught locally before any request was made.
    #[error("validation failed: {0}")]
    Validation(String),

    /// No bearer token in the session store.
    #[error("not authenticated")]
    NotAuthenticated,

    /// The backend answered with a non-2xx status.
    #[error("request rejected ({}): {}", .status, .message.as_deref().unwrap_or("no message"))]
    Rejected {
        status: u16,
        message: Option<String>,
    },

    /// The backend answered `success: false` in its envelope.
    #[error("server reported failure: {}", .message.as_deref().unwrap_or("no message"))]
    ServerError { message: Option<String> },

    /// Network failure, timeout or connection refused.
    #[error("transport error: {0}")]
    Transport(String),

    /// The backend answered but the body was not what the contract says.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// A submission is still in flight.
    #[error("a submission is already in progress")]
    AlreadySubmitting,

    /// The persistent session slot could not be read or written.
    #[error("session storage error: {0}")]
    Storage(String),
}

impl ClientError {
    /// Server-supplied message, if the backend sent one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Rejected { message, .. } | ClientError::ServerError { message } => {
                message.as_deref().filter(|m| !m.is_empty())
            }
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ClientError::Transport(_) | ClientError::Malformed(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Malformed(err.to_string())
        } else {
            ClientError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Malformed(err.to_string())
    }
}
