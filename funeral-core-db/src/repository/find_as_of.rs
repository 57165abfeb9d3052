use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::temporal::{BusinessKey, TemporalEntity, Versioned};

/// Point-in-time lookup: the version whose `[valid_from, valid_to)` covers `instant`
#[async_trait]
pub trait FindAsOf<T: TemporalEntity>: Send + Sync {
    async fn find_as_of(
        &self,
        business_key: &BusinessKey,
        instant: DateTime<Utc>,
    ) -> Result<Option<Versioned<T>>, Box<dyn std::error::Error + Send + Sync>>;
}
