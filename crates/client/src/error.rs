use companion_core::auth_messages::AuthFailure;
use companion_core::navigation::NavError;
use companion_core::types::Credits;

/// Failure talking to the account store.
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The HTTP request itself failed (network, DNS, TLS, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-2xx status.
    #[error("Server rejected the request ({status} {code}): {message}")]
    Rejected {
        status: u16,
        code: String,
        message: String,
    },

    /// The store has no record for this session's account.
    #[error("Account record is unavailable")]
    Missing,
}

impl RemoteError {
    /// The authentication failure carried by a rejection, if any.
    ///
    /// A bare 401 means the access token is no longer accepted.
    pub fn auth_failure(&self) -> Option<AuthFailure> {
        match self {
            RemoteError::Rejected { status, code, .. } => AuthFailure::from_code(code)
                .or((*status == 401).then_some(AuthFailure::SessionExpired)),
            _ => None,
        }
    }
}

/// Errors surfaced by [`ClientSession`](crate::ClientSession).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Local balance does not cover the cost. No remote call was made.
    #[error("Insufficient credits: {required} required, {available} available")]
    InsufficientCredits { required: Credits, available: Credits },

    /// The remote unlock failed. Local state is unchanged.
    #[error("Unlock failed: {0}")]
    UnlockFailed(#[source] RemoteError),

    #[error("Account store unavailable: {0}")]
    RemoteUnavailable(#[source] RemoteError),

    #[error("Invalid request: {0}")]
    Invalid(String),

    #[error("Authentication failed: {}", .0.code())]
    Auth(AuthFailure),

    #[error("Local cache error: {0}")]
    Cache(String),

    #[error(transparent)]
    Navigation(#[from] NavError),
}

impl ClientError {
    /// Classify a failed account fetch: auth rejections keep their meaning.
    pub(crate) fn from_fetch(err: RemoteError) -> Self {
        match err.auth_failure() {
            Some(failure) => ClientError::Auth(failure),
            None => ClientError::RemoteUnavailable(err),
        }
    }
}
