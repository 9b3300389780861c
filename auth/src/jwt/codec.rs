use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::claims::ISSUER;
use super::errors::AccessTokenError;
use super::secret::SigningSecret;
use crate::user::UserId;

/// Default access token lifetime in seconds.
pub const DEFAULT_ACCESS_TOKEN_TTL_SECONDS: i64 = 3600;

/// Access token codec for issuing and validating signed tokens.
///
/// Stateless: the signing secret is supplied on every call, so a single codec
/// can be shared across any number of concurrent requests.
/// Uses HS256 (HMAC with SHA-256).
#[derive(Debug, Clone)]
pub struct AccessTokenCodec {
    algorithm: Algorithm,
    check_issuer: bool,
}

impl AccessTokenCodec {
    /// Create a codec that enforces signature and expiry only.
    pub fn new() -> Self {
        Self {
            algorithm: Algorithm::HS256,
            check_issuer: false,
        }
    }

    /// Additionally reject tokens whose issuer is not [`ISSUER`].
    pub fn with_issuer_check(mut self) -> Self {
        self.check_issuer = true;
        self
    }

    /// Issue a signed access token for a user, valid from now for `ttl`.
    ///
    /// # Arguments
    /// * `user_id` - Subject of the token
    /// * `secret` - Signing secret
    /// * `ttl` - Lifetime (negative values produce an expired token)
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue(
        &self,
        user_id: UserId,
        secret: &SigningSecret,
        ttl: Duration,
    ) -> Result<String, AccessTokenError> {
        self.issue_at(user_id, secret, ttl, Utc::now())
    }

    /// Issue a signed access token with an explicit issuance time.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed or the expiry is out of range
    pub fn issue_at(
        &self,
        user_id: UserId,
        secret: &SigningSecret,
        ttl: Duration,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AccessTokenError> {
        let claims = Claims::for_user(user_id, issued_at, ttl)?;
        let header = Header::new(self.algorithm);

        encode(&header, &claims, secret.encoding_key())
            .map_err(|e| AccessTokenError::EncodingFailed(e.to_string()))
    }

    /// Validate a signed access token and return its subject.
    ///
    /// # Arguments
    /// * `token` - Compact signed token
    /// * `secret` - Signing secret the token must have been signed with
    ///
    /// # Errors
    /// * `InvalidSignature` - Signature does not match `secret`
    /// * `Expired` - Current time is at or past `exp`
    /// * `InvalidIssuer` - Issuer check is enabled and the issuer differs
    /// * `Malformed` - Token is not parseable or the subject is not a user ID
    pub fn validate(
        &self,
        token: &str,
        secret: &SigningSecret,
    ) -> Result<UserId, AccessTokenError> {
        self.decode(token, secret)?.user_id()
    }

    /// Decode and verify a token, returning all of its claims.
    ///
    /// # Errors
    /// Same as [`AccessTokenCodec::validate`], except the subject is not parsed.
    pub fn decode(&self, token: &str, secret: &SigningSecret) -> Result<Claims, AccessTokenError> {
        let token_data = decode::<Claims>(token, secret.decoding_key(), &self.validation())?;

        // jsonwebtoken accepts exp == now; a token is only valid before exp
        if token_data.claims.exp <= Utc::now().timestamp() {
            return Err(AccessTokenError::Expired);
        }

        Ok(token_data.claims)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        if self.check_issuer {
            validation.set_issuer(&[ISSUER]);
        }
        validation
    }
}

impl Default for AccessTokenCodec {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::EncodingKey;
    use serde_json::json;

    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    fn sign_raw(claims: serde_json::Value) -> String {
        encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(SECRET),
        )
        .expect("Failed to encode token")
    }

    #[test]
    fn test_issue_and_validate() {
        let codec = AccessTokenCodec::new();
        let secret = SigningSecret::new(SECRET);
        let user_id = UserId::new();

        let token = codec
            .issue(user_id, &secret, Duration::seconds(DEFAULT_ACCESS_TOKEN_TTL_SECONDS))
            .expect("Failed to issue token");
        assert_eq!(token.split('.').count(), 3);

        let validated = codec.validate(&token, &secret).expect("Failed to validate token");
        assert_eq!(validated, user_id);
    }

    #[test]
    fn test_issued_claims() {
        let codec = AccessTokenCodec::new();
        let secret = SigningSecret::new(SECRET);
        let user_id = UserId::new();
        let now = Utc::now();

        let token = codec
            .issue_at(user_id, &secret, Duration::minutes(10), now)
            .expect("Failed to issue token");
        let claims = codec.decode(&token, &secret).expect("Failed to decode token");

        let expected =
            Claims::for_user(user_id, now, Duration::minutes(10)).expect("Failed to build claims");
        assert_eq!(claims, expected);
        assert_eq!(claims.iss.as_deref(), Some(ISSUER));
    }

    #[test]
    fn test_validate_with_wrong_secret() {
        let codec = AccessTokenCodec::new();
        let token = codec
            .issue(
                UserId::new(),
                &SigningSecret::new(b"secret1_at_least_32_bytes_long_key!"),
                Duration::hours(1),
            )
            .expect("Failed to issue token");

        let result = codec.validate(
            &token,
            &SigningSecret::new(b"secret2_at_least_32_bytes_long_key!"),
        );
        assert_eq!(result, Err(AccessTokenError::InvalidSignature));
    }

    #[test]
    fn test_validate_expired_token() {
        let codec = AccessTokenCodec::new();
        let secret = SigningSecret::new(SECRET);

        let token = codec
            .issue(UserId::new(), &secret, -Duration::hours(1))
            .expect("Failed to issue token");

        assert_eq!(codec.validate(&token, &secret), Err(AccessTokenError::Expired));
    }

    #[test]
    fn test_validate_token_expiring_now() {
        let codec = AccessTokenCodec::new();
        let secret = SigningSecret::new(SECRET);

        let token = sign_raw(json!({
            "sub": UserId::new().to_string(),
            "exp": Utc::now().timestamp(),
        }));

        assert_eq!(codec.validate(&token, &secret), Err(AccessTokenError::Expired));
    }

    #[test]
    fn test_issue_with_out_of_range_ttl() {
        let codec = AccessTokenCodec::new();
        let secret = SigningSecret::new(SECRET);

        let result = codec.issue(UserId::new(), &secret, Duration::seconds(9_000_000_000_000));
        assert!(matches!(result, Err(AccessTokenError::EncodingFailed(_))));
    }

    #[test]
    fn test_wrong_secret_reported_before_expiry() {
        let codec = AccessTokenCodec::new();
        let token = codec
            .issue(UserId::new(), &SigningSecret::new(SECRET), -Duration::hours(1))
            .expect("Failed to issue token");

        let result = codec.validate(&token, &SigningSecret::new(b"another_secret"));
        assert_eq!(result, Err(AccessTokenError::InvalidSignature));
    }

    #[test]
    fn test_validate_malformed_token() {
        let codec = AccessTokenCodec::new();
        let secret = SigningSecret::new(SECRET);

        for token in ["not.a.jwt", "invalid.token.here", "", "abc"] {
            let result = codec.validate(token, &secret);
            assert!(
                matches!(result, Err(AccessTokenError::Malformed(_))),
                "expected malformed for {:?}, got {:?}",
                token,
                result
            );
        }
    }

    #[test]
    fn test_validate_non_uuid_subject() {
        let codec = AccessTokenCodec::new();
        let secret = SigningSecret::new(SECRET);
        let exp = (Utc::now() + Duration::hours(1)).timestamp();

        let token = sign_raw(json!({ "sub": "user123", "exp": exp }));

        assert!(matches!(
            codec.validate(&token, &secret),
            Err(AccessTokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_validate_missing_expiry() {
        let codec = AccessTokenCodec::new();
        let secret = SigningSecret::new(SECRET);

        let token = sign_raw(json!({ "sub": UserId::new().to_string() }));

        assert!(matches!(
            codec.validate(&token, &secret),
            Err(AccessTokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_issuer_not_checked_by_default() {
        let codec = AccessTokenCodec::new();
        let secret = SigningSecret::new(SECRET);
        let user_id = UserId::new();
        let exp = (Utc::now() + Duration::hours(1)).timestamp();

        let token = sign_raw(json!({
            "iss": "elsewhere",
            "sub": user_id.to_string(),
            "exp": exp,
        }));

        assert_eq!(codec.validate(&token, &secret), Ok(user_id));
    }

    #[test]
    fn test_issuer_check() {
        let codec = AccessTokenCodec::new().with_issuer_check();
        let secret = SigningSecret::new(SECRET);
        let user_id = UserId::new();
        let exp = (Utc::now() + Duration::hours(1)).timestamp();

        let foreign = sign_raw(json!({
            "iss": "elsewhere",
            "sub": user_id.to_string(),
            "exp": exp,
        }));
        assert_eq!(
            codec.validate(&foreign, &secret),
            Err(AccessTokenError::InvalidIssuer)
        );

        let own = codec
            .issue(user_id, &secret, Duration::hours(1))
            .expect("Failed to issue token");
        assert_eq!(codec.validate(&own, &secret), Ok(user_id));
    }

    #[test]
    fn test_concurrent_validation() {
        let codec = std::sync::Arc::new(AccessTokenCodec::new());
        let secret = SigningSecret::new(SECRET);
        let user_id = UserId::new();
        let token = codec
            .issue(user_id, &secret, Duration::hours(1))
            .expect("Failed to issue token");

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let codec = codec.clone();
                let secret = secret.clone();
                let token = token.clone();
                std::thread::spawn(move || codec.validate(&token, &secret))
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.join().expect("Thread panicked"), Ok(user_id));
        }
    }
}
