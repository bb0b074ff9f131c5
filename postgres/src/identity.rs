//! Bearer-token lookup against the `auth_tokens` table.

use crate::rows::UserRow;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use eventqa_core::environment::IdentityProvider;
use eventqa_core::types::{User, UserId};
use eventqa_core::{DomainError, Result};
use sha2::{Digest, Sha256};
use sqlx::PgPool;

/// Digest stored in place of a raw bearer token.
#[must_use]
pub fn hash_token(token: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(token.as_bytes()))
}

/// [`IdentityProvider`] reading tokens issued by the account service.
#[derive(Debug, Clone)]
pub struct PgIdentityProvider {
    pool: PgPool,
}

impl PgIdentityProvider {
    /// Create a provider on top of an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Store a token for `user_id` valid until `expires_at`.
    ///
    /// Only the digest is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::Storage`] if the insert fails.
    pub async fn issue_token(
        &self,
        user_id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<()> {
        sqlx::query("INSERT INTO auth_tokens (token_hash, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(hash_token(token))
            .bind(user_id.get())
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to store token: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl IdentityProvider for PgIdentityProvider {
    async fn authenticate(&self, bearer: &str) -> Result<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT u.id, u.email, u.first_name, u.last_name, u.is_registered
            FROM auth_tokens t
            JOIN users u ON u.id = t.user_id
            WHERE t.token_hash = $1 AND t.expires_at > now()
            ",
        )
        .bind(hash_token(bearer))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to resolve token: {e}")))?;

        if row.is_none() {
            tracing::debug!("Bearer token unknown or expired");
        }
        Ok(row.map(User::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable_and_unpadded() {
        let digest = hash_token("secret");
        assert_eq!(digest, hash_token("secret"));
        assert_eq!(digest.len(), 43);
        assert!(!digest.contains('='));
        assert_ne!(digest, hash_token("secret2"));
    }
}
