use thiserror::Error;

/// Error type for access token operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AccessTokenError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Token signature is invalid")]
    InvalidSignature,

    #[error("Token is expired")]
    Expired,

    #[error("Token issuer is not accepted")]
    InvalidIssuer,

    #[error("Token is malformed: {0}")]
    Malformed(String),
}

impl From<jsonwebtoken::errors::Error> for AccessTokenError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => AccessTokenError::Expired,
            ErrorKind::InvalidSignature => AccessTokenError::InvalidSignature,
            ErrorKind::InvalidIssuer => AccessTokenError::InvalidIssuer,
            _ => AccessTokenError::Malformed(err.to_string()),
        }
    }
}
