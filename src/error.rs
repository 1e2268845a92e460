// src/error.rs
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RelayError>;

/// Failure kinds surfaced by the token layer, the recruiting API client and
/// the glue around them.
#[derive(Debug, Error)]
pub enum RelayError {
    /// Authorization code invalid or expired. Carries the provider's raw body.
    #[error("authorization code exchange failed: {0}")]
    AuthExchange(String),

    /// Refresh token missing, invalid or revoked.
    #[error("token refresh failed: {0}")]
    AuthRefresh(String),

    /// No access token could be produced by any path.
    #[error("authentication required: {0}")]
    AuthRequired(#[source] Box<RelayError>),

    /// Non-2xx from the recruiting API after the single credential retry.
    #[error("recruiting API returned status {status}")]
    RemoteApi { status: u16, body: String },

    #[error("transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    /// 2xx response whose body did not have the expected shape.
    #[error("unexpected response from recruiting API: {0}")]
    InvalidResponse(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl RelayError {
    pub fn remote(status: u16, body: impl Into<String>) -> Self {
        Self::RemoteApi {
            status,
            body: body.into(),
        }
    }

    /// True for credential failures, including a recruiting API that still
    /// rejects the token after the retry. These must reach the caller.
    pub fn is_auth(&self) -> bool {
        match self {
            Self::AuthExchange(_) | Self::AuthRefresh(_) | Self::AuthRequired(_) => true,
            Self::RemoteApi { status, .. } => is_credential_status(*status),
            _ => false,
        }
    }

    /// True when the recruiting integration itself is failing or unreachable.
    pub fn is_remote(&self) -> bool {
        match self {
            Self::RemoteApi { status, .. } => !is_credential_status(*status),
            Self::Transport(_) | Self::InvalidResponse(_) => true,
            _ => false,
        }
    }

    /// HTTP status carried by a remote failure, if any.
    pub fn remote_status(&self) -> Option<u16> {
        match self {
            Self::RemoteApi { status, .. } => Some(*status),
            _ => None,
        }
    }
}

fn is_credential_status(status: u16) -> bool {
    matches!(status, 401 | 403)
}
