use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

use super::errors::AccessTokenError;
use crate::user::UserId;

/// Issuer written into every access token.
pub const ISSUER: &str = "chirpy";

/// Access token claims.
///
/// `sub` and `exp` are required on decode. `iss` and `iat` are always written
/// but tolerated when absent, since only signature and expiry are enforced.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Subject (user identifier)
    pub sub: String,

    /// Issued at (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Create claims for a user valid from `issued_at` for `ttl`.
    ///
    /// A negative `ttl` yields claims that are already expired.
    ///
    /// # Errors
    /// * `EncodingFailed` - `issued_at + ttl` is outside the representable range
    pub fn for_user(
        user_id: UserId,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<Self, AccessTokenError> {
        let expiration = issued_at.checked_add_signed(ttl).ok_or_else(|| {
            AccessTokenError::EncodingFailed(format!("Expiration out of range for ttl {}", ttl))
        })?;

        Ok(Self {
            iss: Some(ISSUER.to_string()),
            sub: user_id.to_string(),
            iat: Some(issued_at.timestamp()),
            exp: expiration.timestamp(),
        })
    }

    /// Parse the subject as a user identifier.
    ///
    /// # Errors
    /// * `Malformed` - Subject is not a valid UUID
    pub fn user_id(&self) -> Result<UserId, AccessTokenError> {
        UserId::from_string(&self.sub)
            .map_err(|e| AccessTokenError::Malformed(format!("Invalid subject: {}", e)))
    }
}
