use async_trait::async_trait;
use funeral_core_db::models::temporal::{BusinessKey, Versioned};
use funeral_core_db::repository::FindCurrentBatch;
use std::collections::HashMap;
use std::error::Error;

use super::repo_impl::TemporalRepositoryImpl;
use super::temporal_table::TemporalTable;

#[async_trait]
impl<T: TemporalTable> FindCurrentBatch<T> for TemporalRepositoryImpl<T> {
    async fn find_current_batch(
        &self,
        business_keys: &[BusinessKey],
    ) -> Result<Vec<Option<Versioned<T>>>, Box<dyn Error + Send + Sync>> {
        if business_keys.is_empty() {
            return Ok(Vec::new());
        }
        let keys: Vec<String> = business_keys.iter().map(|k| k.to_string()).collect();
        let found: HashMap<BusinessKey, Versioned<T>> = self
            .fetch_where("business_key = ANY($1) AND is_current", |q| q.bind(keys))
            .await?
            .into_iter()
            .map(|v| (v.meta.business_key.clone(), v))
            .collect();
        Ok(business_keys.iter().map(|key| found.get(key).cloned()).collect())
    }
}
