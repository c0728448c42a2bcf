//! Lead queries.

use async_trait::async_trait;

use coach_exchange_core::{Lead, NewLead};

use super::PgRecordStore;
use crate::error::StoreError;
use crate::records::LeadStore;

#[async_trait]
impl LeadStore for PgRecordStore {
    async fn list_leads(&self) -> Result<Vec<Lead>, StoreError> {
        let leads = sqlx::query_as::<_, Lead>(
            "SELECT id, name, email, phone, comments, listing, created_at
             FROM marketplace.lead
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(leads)
    }

    async fn insert_lead(&self, lead: &NewLead) -> Result<Lead, StoreError> {
        let lead = sqlx::query_as::<_, Lead>(
            "INSERT INTO marketplace.lead (name, email, phone, comments, listing)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id, name, email, phone, comments, listing, created_at",
        )
        .bind(&lead.name)
        .bind(&lead.email)
        .bind(&lead.phone)
        .bind(&lead.comments)
        .bind(&lead.listing)
        .fetch_one(&self.pool)
        .await?;

        Ok(lead)
    }

    async fn count_leads(&self) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM marketplace.lead")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}
