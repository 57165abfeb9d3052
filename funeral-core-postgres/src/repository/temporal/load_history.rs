use async_trait::async_trait;
use funeral_core_db::models::temporal::{BusinessKey, Versioned};
use funeral_core_db::repository::{LoadHistory, Page, PageRequest};
use std::error::Error;

use super::repo_impl::TemporalRepositoryImpl;
use super::temporal_table::TemporalTable;
use crate::error::RepositoryError;

#[async_trait]
impl<T: TemporalTable> LoadHistory<T> for TemporalRepositoryImpl<T> {
    async fn load_history(
        &self,
        business_key: &BusinessKey,
        page: PageRequest,
    ) -> Result<Page<Versioned<T>>, Box<dyn Error + Send + Sync>> {
        let key = business_key.to_string();
        let (limit, offset) = page.as_sql();
        let total: i64 = {
            let count = format!("SELECT COUNT(*) FROM {} WHERE business_key = $1", T::TABLE);
            let mut tx = self.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or(RepositoryError::TransactionConsumed)?;
            sqlx::query_scalar(&count)
                .bind(key.clone())
                .fetch_one(&mut **transaction)
                .await?
        };
        let items = self
            .fetch_where("business_key = $1 ORDER BY version LIMIT $2 OFFSET $3", |q| {
                q.bind(key).bind(limit).bind(offset)
            })
            .await?;
        Ok(Page::new(items, total as usize, page.limit, page.offset))
    }
}
