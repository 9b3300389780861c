use async_trait::async_trait;
use chirpy_auth::RefreshToken;
use chirpy_auth::UserId;
use chrono::DateTime;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::session::errors::RepositoryError;
use crate::domain::session::models::RefreshTokenRecord;
use crate::domain::session::ports::RefreshTokenRepository;

/// Refresh tokens stored in the `refresh_tokens` table.
///
/// Expects `token TEXT PRIMARY KEY`, `user_id UUID` and `TIMESTAMPTZ` columns
/// `created_at`, `updated_at`, `expires_at`, `revoked_at` (nullable).
pub struct PostgresRefreshTokenRepository {
    pool: PgPool,
}

impl PostgresRefreshTokenRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct RefreshTokenRow {
    token: String,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
}

impl TryFrom<RefreshTokenRow> for RefreshTokenRecord {
    type Error = RepositoryError;

    fn try_from(row: RefreshTokenRow) -> Result<Self, Self::Error> {
        let token = RefreshToken::parse(&row.token).map_err(|e| {
            RepositoryError::Database(format!("Stored refresh token is invalid: {}", e))
        })?;

        Ok(Self {
            token,
            user_id: UserId(row.user_id),
            created_at: row.created_at,
            updated_at: row.updated_at,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
        })
    }
}

#[async_trait]
impl RefreshTokenRepository for PostgresRefreshTokenRepository {
    async fn create(
        &self,
        record: RefreshTokenRecord,
    ) -> Result<RefreshTokenRecord, RepositoryError> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            INSERT INTO refresh_tokens
                (token, created_at, updated_at, user_id, expires_at, revoked_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING token, created_at, updated_at, user_id, expires_at, revoked_at
            "#,
        )
        .bind(record.token.as_str())
        .bind(record.created_at)
        .bind(record.updated_at)
        .bind(record.user_id.0)
        .bind(record.expires_at)
        .bind(record.revoked_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let Some(db_err) = e.as_database_error() {
                if db_err.is_unique_violation() {
                    return RepositoryError::Duplicate;
                }
            }
            RepositoryError::Database(e.to_string())
        })?;

        row.try_into()
    }

    async fn find(
        &self,
        token: &RefreshToken,
    ) -> Result<Option<RefreshTokenRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            SELECT token, created_at, updated_at, user_id, expires_at, revoked_at
            FROM refresh_tokens
            WHERE token = $1
            "#,
        )
        .bind(token.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        row.map(RefreshTokenRecord::try_from).transpose()
    }

    async fn revoke(
        &self,
        token: &RefreshToken,
        at: DateTime<Utc>,
    ) -> Result<Option<RefreshTokenRecord>, RepositoryError> {
        // Single statement so concurrent revokes cannot move revoked_at
        let row = sqlx::query_as::<_, RefreshTokenRow>(
            r#"
            UPDATE refresh_tokens
            SET updated_at = CASE WHEN revoked_at IS NULL THEN $2 ELSE updated_at END,
                revoked_at = COALESCE(revoked_at, $2)
            WHERE token = $1
            RETURNING token, created_at, updated_at, user_id, expires_at, revoked_at
            "#,
        )
        .bind(token.as_str())
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::Database(e.to_string()))?;

        row.map(RefreshTokenRecord::try_from).transpose()
    }
}
