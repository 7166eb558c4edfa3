use chrono::{DateTime, Utc};

/// Failures returned by the reset request store.
///
/// `NotFound`, `Expired` and `InvalidToken` are kept apart for the caller's
/// own bookkeeping, but should be rendered identically to end users; see
/// [`ResetError::public_message`].
#[derive(Debug)]
pub enum ResetError {
    NotFound,
    Expired,
    InvalidToken,
    TooManyRequests { available_at: DateTime<Utc> },
    Storage(String),
}

pub type ResetResult<T> = Result<T, ResetError>;

impl ResetError {
    /// True for the three outcomes of presenting a bad token.
    pub fn is_token_failure(&self) -> bool {
        matches!(
            self,
            ResetError::NotFound | ResetError::Expired | ResetError::InvalidToken
        )
    }

    pub fn public_message(&self) -> String {
        match self {
            ResetError::NotFound | ResetError::Expired | ResetError::InvalidToken => {
                "Invalid or expired reset token".to_string()
            }
            ResetError::TooManyRequests { available_at } => format!(
                "A reset link was already requested. Try again after {}",
                available_at.format("%Y-%m-%d %H:%M UTC")
            ),
            ResetError::Storage(_) => "Internal server error".to_string(),
        }
    }
}

impl std::fmt::Display for ResetError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResetError::NotFound => write!(f, "Not Found: no reset request for selector"),
            ResetError::Expired => write!(f, "Expired: reset request is past its lifetime"),
            ResetError::InvalidToken => write!(f, "Invalid Token: verifier does not match"),
            ResetError::TooManyRequests { available_at } => {
                write!(f, "Too Many Requests: next request allowed at {available_at}")
            }
            ResetError::Storage(msg) => write!(f, "Storage Error: {msg}"),
        }
    }
}

impl std::error::Error for ResetError {}

impl From<sqlx::Error> for ResetError {
    fn from(err: sqlx::Error) -> Self {
        ResetError::Storage(err.to_string())
    }
}
