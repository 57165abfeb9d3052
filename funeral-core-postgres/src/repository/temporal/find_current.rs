use async_trait::async_trait;
use funeral_core_db::models::temporal::{BusinessKey, Versioned};
use funeral_core_db::repository::FindCurrent;
use std::error::Error;

use super::repo_impl::TemporalRepositoryImpl;
use super::temporal_table::TemporalTable;

#[async_trait]
impl<T: TemporalTable> FindCurrent<T> for TemporalRepositoryImpl<T> {
    async fn find_current(
        &self,
        business_key: &BusinessKey,
    ) -> Result<Option<Versioned<T>>, Box<dyn Error + Send + Sync>> {
        let key = business_key.to_string();
        let mut rows = self
            .fetch_where("business_key = $1 AND is_current", |q| q.bind(key))
            .await?;
        Ok(rows.pop())
    }
}
