use std::collections::HashMap;

use async_trait::async_trait;
use chirpy_auth::RefreshToken;
use chrono::DateTime;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::domain::session::errors::RepositoryError;
use crate::domain::session::models::RefreshTokenRecord;
use crate::domain::session::models::UserCredentials;
use crate::domain::session::ports::RefreshTokenRepository;
use crate::domain::session::ports::UserCredentialRepository;

/// Process-local refresh token store.
///
/// Revocation happens under the write lock, so concurrent revokes of one
/// token observe a single `revoked_at`.
#[derive(Default)]
pub struct InMemoryRefreshTokenRepository {
    records: RwLock<HashMap<RefreshToken, RefreshTokenRecord>>,
}

impl InMemoryRefreshTokenRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }
}

#[async_trait]
impl RefreshTokenRepository for InMemoryRefreshTokenRepository {
    async fn create(
        &self,
        record: RefreshTokenRecord,
    ) -> Result<RefreshTokenRecord, RepositoryError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.token) {
            return Err(RepositoryError::Duplicate);
        }
        records.insert(record.token.clone(), record.clone());

        Ok(record)
    }

    async fn find(
        &self,
        token: &RefreshToken,
    ) -> Result<Option<RefreshTokenRecord>, RepositoryError> {
        Ok(self.records.read().await.get(token).cloned())
    }

    async fn revoke(
        &self,
        token: &RefreshToken,
        at: DateTime<Utc>,
    ) -> Result<Option<RefreshTokenRecord>, RepositoryError> {
        let mut records = self.records.write().await;

        Ok(records.get_mut(token).map(|record| {
            record.revoke(at);
            record.clone()
        }))
    }
}

/// Process-local credential store keyed by email.
#[derive(Default)]
pub struct InMemoryUserCredentialRepository {
    users: RwLock<HashMap<String, UserCredentials>>,
}

impl InMemoryUserCredentialRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the credentials stored for `credentials.email`.
    pub async fn upsert(&self, credentials: UserCredentials) {
        self.users
            .write()
            .await
            .insert(credentials.email.clone(), credentials);
    }
}

#[async_trait]
impl UserCredentialRepository for InMemoryUserCredentialRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<UserCredentials>, RepositoryError> {
        Ok(self.users.read().await.get(email).cloned())
    }
}
