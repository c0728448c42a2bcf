//! Customer account queries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use coach_exchange_core::{Email, NewUser, User, UserId};

use super::PgRecordStore;
use crate::error::StoreError;
use crate::records::UserStore;

#[derive(sqlx::FromRow)]
struct CredentialRow {
    id: UserId,
    name: String,
    email: Email,
    password_hash: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl UserStore for PgRecordStore {
    async fn find_user_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_at FROM marketplace.customer WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_credentials(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, StoreError> {
        let row = sqlx::query_as::<_, CredentialRow>(
            "SELECT id, name, email, password_hash, created_at
             FROM marketplace.customer WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| {
            (
                User {
                    id: r.id,
                    name: r.name,
                    email: r.email,
                    created_at: r.created_at,
                },
                r.password_hash,
            )
        }))
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_at FROM marketplace.customer WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn insert_user(&self, user: &NewUser) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO marketplace.customer (name, email, password_hash)
             VALUES ($1, $2, $3)
             RETURNING id, name, email, created_at",
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_insert(e, "email"))
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM marketplace.customer")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
