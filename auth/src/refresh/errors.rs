use thiserror::Error;

/// Error type for refresh token operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefreshTokenError {
    #[error("Secure random source failed: {0}")]
    EntropyFailure(String),

    #[error("Invalid refresh token format: {0}")]
    InvalidFormat(String),
}
