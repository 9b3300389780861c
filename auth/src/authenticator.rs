use chrono::Duration;

use crate::jwt::AccessTokenCodec;
use crate::jwt::AccessTokenError;
use crate::jwt::SigningSecret;
use crate::jwt::DEFAULT_ACCESS_TOKEN_TTL_SECONDS;
use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::user::UserId;

/// Authentication coordinator combining password verification and access token
/// issuance.
///
/// Owns the signing secret for the process, so callers only deal in user IDs
/// and token strings.
#[derive(Debug, Clone)]
pub struct Authenticator {
    password_hasher: PasswordHasher,
    codec: AccessTokenCodec,
    secret: SigningSecret,
    access_token_ttl: Duration,
}

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// Authenticated user
    pub user_id: UserId,
    /// Signed access token
    pub access_token: String,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Access token error: {0}")]
    AccessTokenError(#[from] AccessTokenError),
}

impl Authenticator {
    /// Create a new authenticator with default hashing cost and a one hour
    /// access token lifetime.
    ///
    /// # Arguments
    /// * `secret` - Secret used to sign and verify access tokens
    pub fn new(secret: SigningSecret) -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
            codec: AccessTokenCodec::new(),
            secret,
            access_token_ttl: Duration::seconds(DEFAULT_ACCESS_TOKEN_TTL_SECONDS),
        }
    }

    pub fn with_password_hasher(mut self, password_hasher: PasswordHasher) -> Self {
        self.password_hasher = password_hasher;
        self
    }

    pub fn with_codec(mut self, codec: AccessTokenCodec) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_access_token_ttl(mut self, ttl: Duration) -> Self {
        self.access_token_ttl = ttl;
        self
    }

    pub fn access_token_ttl(&self) -> Duration {
        self.access_token_ttl
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `PasswordError` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a password against a stored hash without issuing a token.
    ///
    /// # Errors
    /// * `Mismatch` - Password does not match
    /// * `MalformedHash` - Stored hash cannot be parsed
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<(), PasswordError> {
        self.password_hasher.verify(password, stored_hash)
    }

    /// Verify credentials and issue an access token.
    ///
    /// # Arguments
    /// * `password` - Plaintext password to verify
    /// * `stored_hash` - Stored password hash
    /// * `user_id` - Owner of `stored_hash`
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is malformed
    /// * `AccessTokenError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        user_id: UserId,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        match self.verify_password(password, stored_hash) {
            Ok(()) => {}
            Err(PasswordError::Mismatch) => return Err(AuthenticationError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        }

        let access_token = self.generate_token(user_id)?;

        Ok(AuthenticationResult {
            user_id,
            access_token,
        })
    }

    /// Issue an access token without password verification.
    ///
    /// Used by refresh flows, where identity was established by a refresh
    /// token instead.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token generation failed
    pub fn generate_token(&self, user_id: UserId) -> Result<String, AccessTokenError> {
        self.codec.issue(user_id, &self.secret, self.access_token_ttl)
    }

    /// Validate an access token and return its subject.
    ///
    /// # Errors
    /// * `AccessTokenError` - Token validation failed
    pub fn validate_token(&self, token: &str) -> Result<UserId, AccessTokenError> {
        self.codec.validate(token, &self.secret)
    }
}
