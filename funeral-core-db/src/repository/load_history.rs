use async_trait::async_trait;

use crate::models::temporal::{BusinessKey, TemporalEntity, Versioned};
use crate::repository::pagination::{Page, PageRequest};

/// Loads every version of one business key, oldest first
///
/// Soft-deleted entities keep their history and can still be loaded.
#[async_trait]
pub trait LoadHistory<T: TemporalEntity>: Send + Sync {
    async fn load_history(
        &self,
        business_key: &BusinessKey,
        page: PageRequest,
    ) -> Result<Page<Versioned<T>>, Box<dyn std::error::Error + Send + Sync>>;
}
