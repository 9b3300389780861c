use std::sync::Arc;

use async_trait::async_trait;
use chirpy_auth::header;
use chirpy_auth::header::Credential;
use chirpy_auth::Authenticator;
use chirpy_auth::RefreshToken;
use chirpy_auth::RefreshTokenGenerator;
use chirpy_auth::UserId;
use chrono::Duration;
use chrono::Utc;
use http::HeaderMap;
use tokio::sync::OnceCell;

use crate::domain::session::errors::SessionError;
use crate::domain::session::models::RefreshTokenRecord;
use crate::domain::session::models::RefreshTokenStatus;
use crate::domain::session::models::Session;
use crate::domain::session::ports::RefreshTokenRepository;
use crate::domain::session::ports::SessionServicePort;
use crate::domain::session::ports::UserCredentialRepository;

/// Default refresh token lifetime: 60 days.
pub const DEFAULT_REFRESH_TOKEN_TTL_SECONDS: i64 = 60 * 60 * 24 * 60;

/// Hashed once and verified against when an email is unknown, so a miss costs
/// as much as a wrong password.
const DUMMY_PASSWORD: &str = "chirpy-dummy-password";

/// Domain service implementation for the session lifecycle.
///
/// Password work runs on the blocking thread pool so it never stalls the
/// async executor. Token issuance and validation are cheap and run inline.
pub struct SessionService<RR, UR>
where
    RR: RefreshTokenRepository,
    UR: UserCredentialRepository,
{
    refresh_tokens: Arc<RR>,
    users: Arc<UR>,
    authenticator: Arc<Authenticator>,
    generator: RefreshTokenGenerator,
    refresh_token_ttl: Duration,
    api_key: Option<String>,
    dummy_hash: OnceCell<String>,
}

impl<RR, UR> SessionService<RR, UR>
where
    RR: RefreshTokenRepository,
    UR: UserCredentialRepository,
{
    /// Create a new session service with injected dependencies.
    ///
    /// # Arguments
    /// * `refresh_tokens` - Refresh token persistence
    /// * `users` - Credential lookup
    /// * `authenticator` - Password verification and access token issuance
    pub fn new(refresh_tokens: Arc<RR>, users: Arc<UR>, authenticator: Arc<Authenticator>) -> Self {
        Self {
            refresh_tokens,
            users,
            authenticator,
            generator: RefreshTokenGenerator::new(),
            refresh_token_ttl: Duration::seconds(DEFAULT_REFRESH_TOKEN_TTL_SECONDS),
            api_key: None,
            dummy_hash: OnceCell::new(),
        }
    }

    pub fn with_refresh_token_ttl(mut self, ttl: Duration) -> Self {
        self.refresh_token_ttl = ttl;
        self
    }

    /// Accept `Authorization: ApiKey <key>` for this key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Exchange a bearer-carried refresh token for a new access token.
    ///
    /// # Errors
    /// Same as [`SessionServicePort::refresh`], plus missing or malformed header.
    pub async fn refresh_from_headers(&self, headers: &HeaderMap) -> Result<String, SessionError> {
        let token = required(header::bearer_token(headers))?;
        self.refresh(&token).await
    }

    /// Revoke a bearer-carried refresh token.
    ///
    /// # Errors
    /// Same as [`SessionServicePort::revoke`], plus missing or malformed header.
    pub async fn revoke_from_headers(&self, headers: &HeaderMap) -> Result<(), SessionError> {
        let token = required(header::bearer_token(headers))?;
        self.revoke(&token).await
    }

    async fn verify_unknown_user(&self, password: &str) -> Result<(), SessionError> {
        let dummy_hash = self
            .dummy_hash
            .get_or_try_init(|| async {
                let authenticator = Arc::clone(&self.authenticator);
                let hash =
                    tokio::task::spawn_blocking(move || authenticator.hash_password(DUMMY_PASSWORD))
                        .await
                        .map_err(|e| SessionError::TaskFailed(e.to_string()))??;
                Ok::<_, SessionError>(hash)
            })
            .await?
            .clone();

        let authenticator = Arc::clone(&self.authenticator);
        let password = password.to_string();
        // Only the elapsed time matters here
        let _ = tokio::task::spawn_blocking(move || {
            authenticator.verify_password(&password, &dummy_hash)
        })
        .await;

        Ok(())
    }

    async fn open_session(
        &self,
        user_id: UserId,
        access_token: String,
    ) -> Result<Session, SessionError> {
        let refresh_token = self.generator.generate().inspect_err(|e| {
            tracing::error!(user_id = %user_id, error = %e, "Refresh token generation failed");
        })?;

        let record =
            RefreshTokenRecord::issue(refresh_token, user_id, Utc::now(), self.refresh_token_ttl)
                .inspect_err(|e| {
                    tracing::error!(user_id = %user_id, error = %e, "Refresh token expiry invalid");
                })?;
        let record = self.refresh_tokens.create(record).await?;

        tracing::info!(
            user_id = %user_id,
            expires_at = %record.expires_at,
            "Session opened"
        );

        Ok(Session {
            user_id,
            access_token,
            refresh_token: record.token,
            refresh_token_expires_at: record.expires_at,
        })
    }
}

#[async_trait]
impl<RR, UR> SessionServicePort for SessionService<RR, UR>
where
    RR: RefreshTokenRepository,
    UR: UserCredentialRepository,
{
    async fn login(&self, email: &str, password: &str) -> Result<Session, SessionError> {
        let credentials = match self.users.find_by_email(email).await? {
            Some(credentials) => credentials,
            None => {
                self.verify_unknown_user(password).await?;
                tracing::warn!(reason = "unknown_email", "Login rejected");
                return Err(SessionError::InvalidCredentials);
            }
        };

        let user_id = credentials.id;
        let authenticator = Arc::clone(&self.authenticator);
        let password = password.to_string();
        let result = tokio::task::spawn_blocking(move || {
            authenticator.authenticate(&password, &credentials.password_hash, user_id)
        })
        .await
        .map_err(|e| SessionError::TaskFailed(e.to_string()))?;

        let authenticated = result.map_err(SessionError::from).inspect_err(|e| match e {
            SessionError::InvalidCredentials => {
                tracing::warn!(user_id = %user_id, reason = "password_mismatch", "Login rejected");
            }
            _ => tracing::error!(user_id = %user_id, error = %e, "Login failed"),
        })?;

        self.open_session(user_id, authenticated.access_token).await
    }

    async fn refresh(&self, refresh_token: &str) -> Result<String, SessionError> {
        let token = RefreshToken::parse(refresh_token)?;

        let record = self
            .refresh_tokens
            .find(&token)
            .await?
            .ok_or(SessionError::RefreshTokenNotFound)?;

        match record.status(Utc::now()) {
            RefreshTokenStatus::Usable => {}
            RefreshTokenStatus::Revoked => {
                tracing::warn!(user_id = %record.user_id, reason = "revoked", "Refresh rejected");
                return Err(SessionError::RefreshTokenRevoked);
            }
            RefreshTokenStatus::Expired => {
                tracing::warn!(user_id = %record.user_id, reason = "expired", "Refresh rejected");
                return Err(SessionError::RefreshTokenExpired);
            }
        }

        let access_token = self.authenticator.generate_token(record.user_id)?;
        tracing::debug!(user_id = %record.user_id, "Access token refreshed");

        Ok(access_token)
    }

    async fn revoke(&self, refresh_token: &str) -> Result<(), SessionError> {
        let token = RefreshToken::parse(refresh_token)?;

        let record = self
            .refresh_tokens
            .revoke(&token, Utc::now())
            .await?
            .ok_or(SessionError::RefreshTokenNotFound)?;

        tracing::info!(user_id = %record.user_id, "Refresh token revoked");

        Ok(())
    }

    async fn authenticate(&self, headers: &HeaderMap) -> Result<UserId, SessionError> {
        let token = required(header::bearer_token(headers))?;

        self.authenticator.validate_token(&token).map_err(|e| {
            tracing::debug!(error = %e, "Access token rejected");
            SessionError::from(e)
        })
    }

    async fn authenticate_api_key(&self, headers: &HeaderMap) -> Result<(), SessionError> {
        let presented = required(header::api_key(headers))?;

        let Some(expected) = self.api_key.as_deref() else {
            tracing::warn!("API key presented but none is configured");
            return Err(SessionError::InvalidCredentials);
        };

        if constant_time_eq(presented.as_bytes(), expected.as_bytes()) {
            Ok(())
        } else {
            tracing::warn!(reason = "api_key_mismatch", "API key rejected");
            Err(SessionError::InvalidCredentials)
        }
    }

    async fn hash_password(&self, password: &str) -> Result<String, SessionError> {
        let authenticator = Arc::clone(&self.authenticator);
        let password = password.to_string();

        let hash = tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
            .await
            .map_err(|e| SessionError::TaskFailed(e.to_string()))??;

        Ok(hash)
    }
}

fn required(credential: Credential) -> Result<String, SessionError> {
    match credential {
        Credential::Present(value) => Ok(value),
        Credential::Absent => Err(SessionError::MissingCredential),
        Credential::Malformed => Err(SessionError::MalformedCredential),
    }
}

/// Constant-time byte comparison to prevent timing attacks.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}
