use std::sync::Arc;

use chirpy_auth::Authenticator;
use chirpy_auth::PasswordHasher;
use chirpy_auth::SigningSecret;
use chirpy_auth::UserId;
use http::header::AUTHORIZATION;
use http::HeaderMap;
use http::HeaderValue;
use session_service::outbound::repositories::InMemoryRefreshTokenRepository;
use session_service::outbound::repositories::InMemoryUserCredentialRepository;
use session_service::session::models::UserCredentials;
use session_service::session::service::SessionService;

pub const TEST_SECRET: &str = "test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const TEST_API_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";

pub type TestSessionService =
    SessionService<InMemoryRefreshTokenRepository, InMemoryUserCredentialRepository>;

/// Session service wired to in-memory adapters
pub struct TestApp {
    pub service: TestSessionService,
    pub refresh_tokens: Arc<InMemoryRefreshTokenRepository>,
    pub users: Arc<InMemoryUserCredentialRepository>,
    pub authenticator: Arc<Authenticator>,
}

impl TestApp {
    pub fn spawn() -> Self {
        let refresh_tokens = Arc::new(InMemoryRefreshTokenRepository::new());
        let users = Arc::new(InMemoryUserCredentialRepository::new());
        let authenticator = Arc::new(
            Authenticator::new(SigningSecret::new(TEST_SECRET)).with_password_hasher(
                PasswordHasher::with_params(1024, 1, 1).expect("Failed to build password hasher"),
            ),
        );

        let service = SessionService::new(
            Arc::clone(&refresh_tokens),
            Arc::clone(&users),
            Arc::clone(&authenticator),
        )
        .with_api_key(TEST_API_KEY);

        Self {
            service,
            refresh_tokens,
            users,
            authenticator,
        }
    }

    /// Store a user with the given email and password
    pub async fn register(&self, email: &str, password: &str) -> UserId {
        let id = UserId::new();
        let password_hash = self
            .authenticator
            .hash_password(password)
            .expect("Failed to hash password");

        self.users
            .upsert(UserCredentials {
                id,
                email: email.to_string(),
                password_hash,
            })
            .await;

        id
    }
}

pub fn authorization(value: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(value).expect("Invalid header value"),
    );
    headers
}

pub fn bearer(token: &str) -> HeaderMap {
    authorization(&format!("Bearer {}", token))
}
