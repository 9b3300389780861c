use async_trait::async_trait;
use chirpy_auth::RefreshToken;
use chirpy_auth::UserId;
use chrono::DateTime;
use chrono::Utc;
use http::HeaderMap;

use crate::domain::session::errors::RepositoryError;
use crate::domain::session::errors::SessionError;
use crate::domain::session::models::RefreshTokenRecord;
use crate::domain::session::models::Session;
use crate::domain::session::models::UserCredentials;

/// Port for session lifecycle operations.
#[async_trait]
pub trait SessionServicePort: Send + Sync + 'static {
    /// Verify a password and open a session.
    ///
    /// # Arguments
    /// * `email` - Login email
    /// * `password` - Plaintext password
    ///
    /// # Returns
    /// Access token plus a freshly persisted refresh token
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password
    /// * `Password` - Stored hash is malformed or hashing failed
    /// * `RefreshToken` - Secure random source failed
    /// * `Repository` - Persistence failed
    async fn login(&self, email: &str, password: &str) -> Result<Session, SessionError>;

    /// Exchange a refresh token for a new access token.
    ///
    /// # Errors
    /// * `RefreshToken` - Token is not in refresh token format
    /// * `RefreshTokenNotFound` - Token was never issued
    /// * `RefreshTokenRevoked` - Token has been revoked
    /// * `RefreshTokenExpired` - Token is past its expiry
    /// * `Repository` - Persistence failed
    async fn refresh(&self, refresh_token: &str) -> Result<String, SessionError>;

    /// Revoke a refresh token. Revoking twice is not an error.
    ///
    /// # Errors
    /// * `RefreshToken` - Token is not in refresh token format
    /// * `RefreshTokenNotFound` - Token was never issued
    /// * `Repository` - Persistence failed
    async fn revoke(&self, refresh_token: &str) -> Result<(), SessionError>;

    /// Identify the caller from a bearer access token.
    ///
    /// # Errors
    /// * `MissingCredential` - No `Authorization` header
    /// * `MalformedCredential` - Header is not `Bearer <token>`
    /// * `AccessToken` - Token is invalid, expired or malformed
    async fn authenticate(&self, headers: &HeaderMap) -> Result<UserId, SessionError>;

    /// Check the `ApiKey` credential against the configured webhook key.
    ///
    /// # Errors
    /// * `MissingCredential` - No `Authorization` header
    /// * `MalformedCredential` - Header is not `ApiKey <key>`
    /// * `InvalidCredentials` - Key differs or no key is configured
    async fn authenticate_api_key(&self, headers: &HeaderMap) -> Result<(), SessionError>;

    /// Hash a new password for registration or password change.
    ///
    /// # Errors
    /// * `Password` - Hashing failed
    async fn hash_password(&self, password: &str) -> Result<String, SessionError>;
}

/// Persistence operations for refresh tokens.
///
/// Implementations must make `revoke` atomic with respect to concurrent
/// callers and must never clear or move an existing `revoked_at`.
#[async_trait]
pub trait RefreshTokenRepository: Send + Sync + 'static {
    /// Persist a new refresh token record.
    ///
    /// # Errors
    /// * `Duplicate` - A record with the same token exists
    /// * `Database` - Storage failed
    async fn create(
        &self,
        record: RefreshTokenRecord,
    ) -> Result<RefreshTokenRecord, RepositoryError>;

    /// Retrieve a record by token.
    ///
    /// # Returns
    /// Optional record (None if not found)
    ///
    /// # Errors
    /// * `Database` - Storage failed
    async fn find(
        &self,
        token: &RefreshToken,
    ) -> Result<Option<RefreshTokenRecord>, RepositoryError>;

    /// Mark a record revoked at `at` unless it is already revoked.
    ///
    /// # Returns
    /// The record after the update (None if not found)
    ///
    /// # Errors
    /// * `Database` - Storage failed
    async fn revoke(
        &self,
        token: &RefreshToken,
        at: DateTime<Utc>,
    ) -> Result<Option<RefreshTokenRecord>, RepositoryError>;
}

/// Lookup of stored login credentials.
#[async_trait]
pub trait UserCredentialRepository: Send + Sync + 'static {
    /// Retrieve credentials by email address.
    ///
    /// # Returns
    /// Optional credentials (None if no user has this email)
    ///
    /// # Errors
    /// * `Database` - Storage failed
    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, RepositoryError>;
}
