use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::rand_core::RngCore;

use super::errors::RefreshTokenError;

/// Random bytes per refresh token.
pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Length of the hex-encoded wire form.
pub const REFRESH_TOKEN_HEX_LENGTH: usize = REFRESH_TOKEN_BYTES * 2;

/// Opaque refresh token: 64 lowercase hexadecimal characters.
///
/// The value is a bearer secret, so `Debug` only shows a redacted form.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct RefreshToken(String);

impl RefreshToken {
    /// Parse a refresh token received from a client.
    ///
    /// # Errors
    /// * `InvalidFormat` - Not exactly 64 lowercase hex characters
    pub fn parse(token: &str) -> Result<Self, RefreshTokenError> {
        if token.len() != REFRESH_TOKEN_HEX_LENGTH {
            return Err(RefreshTokenError::InvalidFormat(format!(
                "expected {} characters, got {}",
                REFRESH_TOKEN_HEX_LENGTH,
                token.len()
            )));
        }

        if !token
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(RefreshTokenError::InvalidFormat(
                "expected lowercase hexadecimal characters".to_string(),
            ));
        }

        Ok(Self(token.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for RefreshToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RefreshToken(..)")
    }
}

/// Generator for refresh tokens backed by the operating system CSPRNG.
///
/// Stateless. Tokens are unique with overwhelming probability (2^256 space),
/// which is what allows storage to use them as primary keys directly.
#[derive(Debug, Clone, Copy, Default)]
pub struct RefreshTokenGenerator;

impl RefreshTokenGenerator {
    pub fn new() -> Self {
        Self
    }

    /// Generate a fresh refresh token.
    ///
    /// # Errors
    /// * `EntropyFailure` - The OS random source could not supply bytes
    pub fn generate(&self) -> Result<RefreshToken, RefreshTokenError> {
        let mut bytes = [0u8; REFRESH_TOKEN_BYTES];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| RefreshTokenError::EntropyFailure(e.to_string()))?;

        Ok(RefreshToken(hex::encode(bytes)))
    }
}
