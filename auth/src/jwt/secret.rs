use std::fmt;

use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;

/// Shared symmetric key used to sign and verify access tokens.
///
/// Passed explicitly to every issue/validate call so it can differ per test or
/// be rotated without touching global state. The key material never appears in
/// `Debug` output.
#[derive(Clone)]
pub struct SigningSecret {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl SigningSecret {
    /// Create a signing secret from raw key bytes.
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        let secret = secret.as_ref();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
        }
    }

    pub(crate) fn encoding_key(&self) -> &EncodingKey {
        &self.encoding_key
    }

    pub(crate) fn decoding_key(&self) -> &DecodingKey {
        &self.decoding_key
    }
}

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(..)")
    }
}
