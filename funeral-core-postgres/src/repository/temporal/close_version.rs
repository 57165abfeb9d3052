use async_trait::async_trait;
use chrono::Utc;
use funeral_core_db::models::temporal::BusinessKey;
use funeral_core_db::repository::CloseVersion;
use std::error::Error;
use tracing::debug;
use uuid::Uuid;

use super::repo_impl::TemporalRepositoryImpl;
use super::temporal_table::TemporalTable;
use crate::error::RepositoryError;

#[async_trait]
impl<T: TemporalTable> CloseVersion<T> for TemporalRepositoryImpl<T> {
    /// Soft delete: the current versions are closed and no successor is written.
    async fn close_versions(
        &self,
        business_keys: &[BusinessKey],
        actor: Uuid,
    ) -> Result<usize, Box<dyn Error + Send + Sync>> {
        if business_keys.is_empty() {
            return Ok(0);
        }
        let keys: Vec<String> = business_keys.iter().map(|k| k.to_string()).collect();
        let sql = format!(
            "UPDATE {} SET valid_to = $2, is_current = FALSE, updated_by = $3, updated_at = $2 \
             WHERE business_key = ANY($1) AND is_current",
            T::TABLE
        );
        let result = {
            let mut tx = self.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or(RepositoryError::TransactionConsumed)?;
            sqlx::query(&sql)
                .bind(keys)
                .bind(Utc::now())
                .bind(actor)
                .execute(&mut **transaction)
                .await?
        };
        let closed = result.rows_affected() as usize;
        debug!(entity = T::ENTITY, closed, "Closed current versions");
        Ok(closed)
    }
}
