use std::fmt;

use chirpy_auth::RefreshToken;
use chirpy_auth::UserId;
use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::domain::session::errors::SessionError;

/// Persisted refresh token record.
///
/// Usable iff it has not been revoked and `now < expires_at`. Revocation is
/// monotonic: once `revoked_at` is set it is never cleared or moved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenRecord {
    pub token: RefreshToken,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

/// Lifecycle state of a refresh token at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTokenStatus {
    Usable,
    Expired,
    Revoked,
}

impl RefreshTokenRecord {
    /// Build a fresh, unrevoked record expiring `ttl` after `now`.
    ///
    /// # Errors
    /// * `ExpiryOutOfRange` - `now + ttl` is not a representable timestamp
    pub fn issue(
        token: RefreshToken,
        user_id: UserId,
        now: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, SessionError> {
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| SessionError::ExpiryOutOfRange(ttl.to_string()))?;

        Ok(Self {
            token,
            user_id,
            created_at: now,
            updated_at: now,
            expires_at,
            revoked_at: None,
        })
    }

    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Revocation takes precedence over expiry.
    pub fn status(&self, now: DateTime<Utc>) -> RefreshTokenStatus {
        if self.is_revoked() {
            RefreshTokenStatus::Revoked
        } else if self.is_expired(now) {
            RefreshTokenStatus::Expired
        } else {
            RefreshTokenStatus::Usable
        }
    }

    pub fn is_usable(&self, now: DateTime<Utc>) -> bool {
        self.status(now) == RefreshTokenStatus::Usable
    }

    /// Revoke the token at `now` unless it is already revoked.
    ///
    /// # Returns
    /// `true` if this call revoked the token
    pub fn revoke(&mut self, now: DateTime<Utc>) -> bool {
        if self.is_revoked() {
            return false;
        }
        self.revoked_at = Some(now);
        self.updated_at = now;
        true
    }
}

/// The part of a user record that login needs.
#[derive(Clone, PartialEq, Eq)]
pub struct UserCredentials {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
}

impl fmt::Debug for UserCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserCredentials")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("password_hash", &"..")
            .finish()
    }
}

/// Tokens handed to a client after a successful login.
#[derive(Debug, Clone)]
pub struct Session {
    pub user_id: UserId,
    pub access_token: String,
    pub refresh_token: RefreshToken,
    pub refresh_token_expires_at: DateTime<Utc>,
}
