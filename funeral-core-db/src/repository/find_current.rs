use async_trait::async_trait;

use crate::models::temporal::{BusinessKey, TemporalEntity, Versioned};

/// Loads the current version of a temporal entity
///
/// Returns `None` when the business key is unknown or its history has been
/// closed by a soft delete.
#[async_trait]
pub trait FindCurrent<T: TemporalEntity>: Send + Sync {
    async fn find_current(
        &self,
        business_key: &BusinessKey,
    ) -> Result<Option<Versioned<T>>, Box<dyn std::error::Error + Send + Sync>>;
}
