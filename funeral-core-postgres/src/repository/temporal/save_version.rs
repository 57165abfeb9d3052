use async_trait::async_trait;
use chrono::Utc;
use funeral_core_db::models::temporal::Versioned;
use funeral_core_db::repository::SaveVersion;
use std::error::Error;
use tracing::debug;
use uuid::Uuid;

use super::repo_impl::TemporalRepositoryImpl;
use super::temporal_table::{bind_meta, insert_sql, TemporalTable};
use crate::error::RepositoryError;

impl<T: TemporalTable> TemporalRepositoryImpl<T> {
    /// Close-then-insert for every changed item.
    ///
    /// The close only matches while the stored row is still the current
    /// version the caller read; a lost race surfaces as `ConcurrentUpdate`.
    pub(super) async fn save_versions_impl(
        repo: &TemporalRepositoryImpl<T>,
        items: Vec<Versioned<T>>,
        actor: Uuid,
    ) -> Result<Vec<Versioned<T>>, Box<dyn Error + Send + Sync>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let now = Utc::now();
        let insert = insert_sql::<T>();
        let close = format!(
            "UPDATE {} SET valid_to = $2, is_current = FALSE WHERE id = $1 AND version = $3 AND is_current",
            T::TABLE
        );
        let still_current = format!(
            "SELECT EXISTS (SELECT 1 FROM {} WHERE id = $1 AND version = $2 AND is_current)",
            T::TABLE
        );

        let mut saved = Vec::with_capacity(items.len());
        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or(RepositoryError::TransactionConsumed)?;
        for item in items {
            let concurrent = || RepositoryError::ConcurrentUpdate {
                entity: T::ENTITY,
                business_key: item.meta.business_key.to_string(),
            };
            let Some(step) = item.supersede(actor, now)? else {
                let current: bool = sqlx::query_scalar(&still_current)
                    .bind(item.meta.id)
                    .bind(item.meta.version)
                    .fetch_one(&mut **transaction)
                    .await?;
                if !current {
                    return Err(concurrent().into());
                }
                saved.push(item);
                continue;
            };

            let closed = sqlx::query(&close)
                .bind(step.closed.id)
                .bind(step.closed.valid_to)
                .bind(step.closed.version)
                .execute(&mut **transaction)
                .await?;
            if closed.rows_affected() != 1 {
                return Err(concurrent().into());
            }
            step.next
                .data
                .bind_data(bind_meta(&step.next.meta, sqlx::query(&insert)))
                .execute(&mut **transaction)
                .await?;
            debug!(
                entity = T::ENTITY,
                business_key = %step.next.meta.business_key,
                version = step.next.meta.version,
                "Superseded version"
            );
            saved.push(step.next);
        }
        Ok(saved)
    }
}

#[async_trait]
impl<T: TemporalTable> SaveVersion<T> for TemporalRepositoryImpl<T> {
    async fn save_versions(
        &self,
        items: Vec<Versioned<T>>,
        actor: Uuid,
    ) -> Result<Vec<Versioned<T>>, Box<dyn Error + Send + Sync>> {
        Self::save_versions_impl(self, items, actor).await
    }
}
