//! Run with `DATABASE_URL=postgres://... cargo test -- --ignored`.

use chirpy_auth::RefreshTokenGenerator;
use chirpy_auth::UserId;
use chrono::Duration;
use chrono::DurationRound;
use chrono::Utc;
use session_service::outbound::repositories::PostgresRefreshTokenRepository;
use session_service::outbound::repositories::PostgresUserCredentialRepository;
use session_service::session::errors::RepositoryError;
use session_service::session::models::RefreshTokenRecord;
use session_service::session::ports::RefreshTokenRepository;
use session_service::session::ports::UserCredentialRepository;
use sqlx::PgPool;

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pool = PgPool::connect(&url)
        .await
        .expect("Failed to connect to Postgres");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            hashed_password TEXT NOT NULL
        )
        "#,
    )
    .execute(&pool)
    .await
    .expect("Failed to create users table");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS refresh_tokens (
            token TEXT PRIMARY KEY,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            user_id UUID NOT NULL,
            expires_at TIMESTAMPTZ NOT NULL,
            revoked_at TIMESTAMPTZ
        )
        "#,
    )
    .execute(&pool)
    .await
    .expect("Failed to create refresh_tokens table");

    pool
}

/// Postgres keeps microseconds.
fn now() -> chrono::DateTime<Utc> {
    Utc::now()
        .duration_trunc(Duration::microseconds(1))
        .expect("Failed to truncate timestamp")
}

fn record() -> RefreshTokenRecord {
    let token = RefreshTokenGenerator::new()
        .generate()
        .expect("Failed to generate refresh token");
    RefreshTokenRecord::issue(token, UserId::new(), now(), Duration::days(60))
        .expect("Failed to issue record")
}

#[tokio::test]
#[ignore]
async fn test_create_and_find() {
    let repository = PostgresRefreshTokenRepository::new(pool().await);
    let record = record();

    let created = repository
        .create(record.clone())
        .await
        .expect("Failed to create record");
    assert_eq!(created, record);

    let found = repository
        .find(&record.token)
        .await
        .expect("Failed to find record");
    assert_eq!(found, Some(record.clone()));

    let result = repository.create(record).await;
    assert_eq!(result, Err(RepositoryError::Duplicate));
}

#[tokio::test]
#[ignore]
async fn test_revoke_is_monotonic() {
    let repository = PostgresRefreshTokenRepository::new(pool().await);
    let record = record();
    repository
        .create(record.clone())
        .await
        .expect("Failed to create record");

    let first_at = now();
    let first = repository
        .revoke(&record.token, first_at)
        .await
        .expect("Failed to revoke")
        .expect("Record missing");
    assert_eq!(first.revoked_at, Some(first_at));
    assert_eq!(first.updated_at, first_at);

    let second = repository
        .revoke(&record.token, first_at + Duration::minutes(5))
        .await
        .expect("Failed to revoke")
        .expect("Record missing");
    assert_eq!(second.revoked_at, Some(first_at));
    assert_eq!(second.updated_at, first_at);
}

#[tokio::test]
#[ignore]
async fn test_revoke_unknown_token() {
    let repository = PostgresRefreshTokenRepository::new(pool().await);
    let token = RefreshTokenGenerator::new()
        .generate()
        .expect("Failed to generate refresh token");

    let result = repository
        .revoke(&token, now())
        .await
        .expect("Failed to revoke");
    assert!(result.is_none());
}

#[tokio::test]
#[ignore]
async fn test_find_user_by_email() {
    let pool = pool().await;
    let id = UserId::new();
    let email = format!("{}@example.com", id);
    sqlx::query("INSERT INTO users (id, email, hashed_password) VALUES ($1, $2, $3)")
        .bind(id.0)
        .bind(&email)
        .bind("$argon2id$v=19$m=1024,t=1,p=1$c2FsdHNhbHQ$aGFzaGhhc2g")
        .execute(&pool)
        .await
        .expect("Failed to insert user");

    let repository = PostgresUserCredentialRepository::new(pool);
    let credentials = repository
        .find_by_email(&email)
        .await
        .expect("Failed to find user")
        .expect("User missing");
    assert_eq!(credentials.id, id);
    assert_eq!(credentials.email, email);

    let missing = repository
        .find_by_email("nobody@example.com")
        .await
        .expect("Failed to query user");
    assert!(missing.is_none());
}
