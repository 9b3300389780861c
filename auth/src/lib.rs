//! Authentication core for the chirpy API
//!
//! Provides the security-sensitive building blocks of the session lifecycle:
//! - Password hashing (Argon2id)
//! - Short-lived signed access tokens (HS256 JWT)
//! - Opaque refresh tokens from the OS random source
//! - `Authorization` header credential extraction (`Bearer`, `ApiKey`)
//!
//! Nothing here performs I/O or holds mutable state; persistence of refresh
//! tokens and the decision to reject a request belong to the caller.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use chirpy_auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify("my_password", &hash).is_ok());
//! assert!(hasher.verify("other", &hash).is_err());
//! ```
//!
//! ## Access Tokens
//! ```
//! use chirpy_auth::{AccessTokenCodec, SigningSecret, UserId};
//! use chrono::Duration;
//!
//! let codec = AccessTokenCodec::new();
//! let secret = SigningSecret::new(b"secret_key_at_least_32_bytes_long!");
//! let user_id = UserId::new();
//! let token = codec.issue(user_id, &secret, Duration::hours(1)).unwrap();
//! assert_eq!(codec.validate(&token, &secret).unwrap(), user_id);
//! ```
//!
//! ## Refresh Tokens and Headers
//! ```
//! use chirpy_auth::header::{self, Credential, Scheme};
//! use chirpy_auth::RefreshTokenGenerator;
//!
//! let token = RefreshTokenGenerator::new().generate().unwrap();
//! assert_eq!(token.as_str().len(), 64);
//!
//! let credential = header::extract(Some("Bearer abc"), Scheme::Bearer);
//! assert_eq!(credential, Credential::Present("abc".to_string()));
//! ```

pub mod authenticator;
pub mod header;
pub mod jwt;
pub mod password;
pub mod refresh;
pub mod user;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use header::Credential;
pub use jwt::AccessTokenCodec;
pub use jwt::AccessTokenError;
pub use jwt::Claims;
pub use jwt::SigningSecret;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use refresh::RefreshToken;
pub use refresh::RefreshTokenError;
pub use refresh::RefreshTokenGenerator;
pub use user::UserId;
pub use user::UserIdError;
