use async_trait::async_trait;
use funeral_core_db::models::temporal::Versioned;
use funeral_core_db::repository::CreateVersioned;
use std::error::Error;
use tracing::debug;

use super::repo_impl::TemporalRepositoryImpl;
use super::temporal_table::{bind_meta, insert_sql, TemporalTable};
use crate::error::RepositoryError;

impl<T: TemporalTable> TemporalRepositoryImpl<T> {
    pub(super) async fn create_versioned_impl(
        repo: &TemporalRepositoryImpl<T>,
        items: Vec<Versioned<T>>,
    ) -> Result<Vec<Versioned<T>>, Box<dyn Error + Send + Sync>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let insert = insert_sql::<T>();
        let exists = format!("SELECT EXISTS (SELECT 1 FROM {} WHERE business_key = $1)", T::TABLE);

        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or(RepositoryError::TransactionConsumed)?;
        for item in &items {
            let taken: bool = sqlx::query_scalar(&exists)
                .bind(item.meta.business_key.to_string())
                .fetch_one(&mut **transaction)
                .await?;
            if taken {
                return Err(RepositoryError::AlreadyExists {
                    entity: T::ENTITY,
                    business_key: item.meta.business_key.to_string(),
                }
                .into());
            }
            item.data
                .bind_data(bind_meta(&item.meta, sqlx::query(&insert)))
                .execute(&mut **transaction)
                .await?;
        }
        debug!(entity = T::ENTITY, count = items.len(), "Inserted first versions");
        Ok(items)
    }
}

#[async_trait]
impl<T: TemporalTable> CreateVersioned<T> for TemporalRepositoryImpl<T> {
    async fn create_versioned(
        &self,
        items: Vec<Versioned<T>>,
    ) -> Result<Vec<Versioned<T>>, Box<dyn Error + Send + Sync>> {
        Self::create_versioned_impl(self, items).await
    }
}
