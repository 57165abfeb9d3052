use async_trait::async_trait;
use uuid::Uuid;

use crate::models::identifiable::Identifiable;

/// Generic repository trait for loading multiple non-versioned entities by their IDs
///
/// Returns items in the same order as the provided IDs.
/// Missing items are represented as None in the result.
#[async_trait]
pub trait LoadBatch<T: Identifiable>: Send + Sync {
    /// Load multiple entities by their unique identifiers
    ///
    /// # Returns
    /// * `Ok(Vec<Option<T>>)` - A vector of optional entities in the same order as the provided IDs
    /// * `Err` - An error if the query could not be executed
    async fn load_batch(&self, ids: &[Uuid]) -> Result<Vec<Option<T>>, Box<dyn std::error::Error + Send + Sync>>;
}
