use async_trait::async_trait;
use uuid::Uuid;

use crate::models::temporal::{BusinessKey, TemporalEntity};

/// Soft deletes temporal entities by closing their current version
///
/// No successor is inserted, so the history keeps every version and ends
/// with a closed interval.
///
/// # Returns
/// * `Ok(usize)` - Number of business keys that had a current version
/// * `Err` - An error if the transaction could not be executed
#[async_trait]
pub trait CloseVersion<T: TemporalEntity>: Send + Sync {
    async fn close_versions(
        &self,
        business_keys: &[BusinessKey],
        actor: Uuid,
    ) -> Result<usize, Box<dyn std::error::Error + Send + Sync>>;
}
