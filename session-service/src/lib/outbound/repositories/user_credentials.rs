use async_trait::async_trait;
use chirpy_auth::UserId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::session::errors::RepositoryError;
use crate::domain::session::models::UserCredentials;
use crate::domain::session::ports::UserCredentialRepository;

/// Login credentials read from the `users` table.
pub struct PostgresUserCredentialRepository {
    pool: PgPool,
}

impl PostgresUserCredentialRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserCredentialsRow {
    id: Uuid,
    email: String,
    hashed_password: String,
}

impl From<UserCredentialsRow> for UserCredentials {
    fn from(row: UserCredentialsRow) -> Self {
        Self {
            id: UserId(row.id),
            email: row.email,
            password_hash: row.hashed_password,
        }
    }
}

#[async_trait]
impl UserCredentialRepository for PostgresUserCredentialRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, RepositoryError> {
        let row = sqlx::query_as::<_, UserCredentialsRow>(
            r#"
            SELECT id, email, hashed_password
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        Ok(row.map(UserCredentials::from))
    }
}
