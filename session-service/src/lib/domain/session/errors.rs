use chirpy_auth::AccessTokenError;
use chirpy_auth::AuthenticationError;
use chirpy_auth::PasswordError;
use chirpy_auth::RefreshTokenError;
use thiserror::Error;

/// Error for persistence operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Refresh token already exists")]
    Duplicate,

    #[error("Database error: {0}")]
    Database(String),
}

/// Top-level error for session lifecycle operations
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    // Credential presentation errors
    #[error("Missing credential")]
    MissingCredential,

    #[error("Malformed credential")]
    MalformedCredential,

    #[error("Invalid credentials")]
    InvalidCredentials,

    // Token errors
    #[error("Access token error: {0}")]
    AccessToken(#[from] AccessTokenError),

    #[error("Refresh token error: {0}")]
    RefreshToken(#[from] RefreshTokenError),

    #[error("Refresh token not found")]
    RefreshTokenNotFound,

    #[error("Refresh token expired")]
    RefreshTokenExpired,

    #[error("Refresh token revoked")]
    RefreshTokenRevoked,

    #[error("Refresh token expiry out of range for ttl {0}")]
    ExpiryOutOfRange(String),

    // Infrastructure errors
    #[error("Password error: {0}")]
    Password(#[from] PasswordError),

    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl SessionError {
    /// Whether this error is an expected authentication failure.
    ///
    /// These all map to the same generic unauthorized outcome at the API
    /// boundary. Everything else is an internal failure. Neither kind is
    /// worth retrying.
    pub fn is_unauthorized(&self) -> bool {
        match self {
            SessionError::MissingCredential
            | SessionError::MalformedCredential
            | SessionError::InvalidCredentials
            | SessionError::RefreshTokenNotFound
            | SessionError::RefreshTokenExpired
            | SessionError::RefreshTokenRevoked => true,
            SessionError::AccessToken(e) => !matches!(e, AccessTokenError::EncodingFailed(_)),
            SessionError::RefreshToken(e) => matches!(e, RefreshTokenError::InvalidFormat(_)),
            SessionError::Password(e) => matches!(e, PasswordError::Mismatch),
            SessionError::ExpiryOutOfRange(_)
            | SessionError::Repository(_)
            | SessionError::TaskFailed(_) => false,
        }
    }
}

impl From<AuthenticationError> for SessionError {
    fn from(err: AuthenticationError) -> Self {
        match err {
            AuthenticationError::InvalidCredentials => SessionError::InvalidCredentials,
            AuthenticationError::PasswordError(e) => SessionError::Password(e),
            AuthenticationError::AccessTokenError(e) => SessionError::AccessToken(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expected_failures_are_unauthorized() {
        let unauthorized = [
            SessionError::MissingCredential,
            SessionError::MalformedCredential,
            SessionError::InvalidCredentials,
            SessionError::RefreshTokenNotFound,
            SessionError::RefreshTokenExpired,
            SessionError::RefreshTokenRevoked,
            SessionError::AccessToken(AccessTokenError::Expired),
            SessionError::AccessToken(AccessTokenError::InvalidSignature),
            SessionError::AccessToken(AccessTokenError::Malformed("x".to_string())),
            SessionError::RefreshToken(RefreshTokenError::InvalidFormat("x".to_string())),
            SessionError::Password(PasswordError::Mismatch),
        ];

        for err in unauthorized {
            assert!(err.is_unauthorized(), "{:?} should be unauthorized", err);
        }
    }

    #[test]
    fn test_internal_failures_are_not_unauthorized() {
        let internal = [
            SessionError::AccessToken(AccessTokenError::EncodingFailed("x".to_string())),
            SessionError::RefreshToken(RefreshTokenError::EntropyFailure("x".to_string())),
            SessionError::Password(PasswordError::HashingFailed("x".to_string())),
            SessionError::Password(PasswordError::MalformedHash("x".to_string())),
            SessionError::ExpiryOutOfRange("x".to_string()),
            SessionError::Repository(RepositoryError::Database("x".to_string())),
            SessionError::TaskFailed("x".to_string()),
        ];

        for err in internal {
            assert!(!err.is_unauthorized(), "{:?} should be internal", err);
        }
    }

    #[test]
    fn test_from_authentication_error() {
        assert!(matches!(
            SessionError::from(AuthenticationError::InvalidCredentials),
            SessionError::InvalidCredentials
        ));
        assert!(matches!(
            SessionError::from(AuthenticationError::AccessTokenError(AccessTokenError::Expired)),
            SessionError::AccessToken(AccessTokenError::Expired)
        ));
    }
}
