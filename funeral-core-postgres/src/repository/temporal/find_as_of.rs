use async_trait::async_trait;
use chrono::{DateTime, Utc};
use funeral_core_db::models::temporal::{BusinessKey, Versioned};
use funeral_core_db::repository::FindAsOf;
use std::error::Error;

use super::repo_impl::TemporalRepositoryImpl;
use super::temporal_table::TemporalTable;

#[async_trait]
impl<T: TemporalTable> FindAsOf<T> for TemporalRepositoryImpl<T> {
    async fn find_as_of(
        &self,
        business_key: &BusinessKey,
        instant: DateTime<Utc>,
    ) -> Result<Option<Versioned<T>>, Box<dyn Error + Send + Sync>> {
        let key = business_key.to_string();
        let mut rows = self
            .fetch_where(
                "business_key = $1 AND valid_from <= $2 AND (valid_to IS NULL OR valid_to > $2)",
                |q| q.bind(key).bind(instant),
            )
            .await?;
        Ok(rows.pop())
    }
}
