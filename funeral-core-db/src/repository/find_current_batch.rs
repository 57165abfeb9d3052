use async_trait::async_trait;

use crate::models::temporal::{BusinessKey, TemporalEntity, Versioned};

/// Loads the current versions of several temporal entities
///
/// # Returns
/// * `Ok(Vec<Option<Versioned<T>>>)` - One entry per key, in input order
///   - `Some` for keys with a current version
///   - `None` for unknown or soft-deleted keys
/// * `Err` - An error if the query could not be executed
#[async_trait]
pub trait FindCurrentBatch<T: TemporalEntity>: Send + Sync {
    async fn find_current_batch(
        &self,
        business_keys: &[BusinessKey],
    ) -> Result<Vec<Option<Versioned<T>>>, Box<dyn std::error::Error + Send + Sync>>;
}
