use async_trait::async_trait;
use uuid::Uuid;

use crate::models::temporal::{TemporalEntity, Versioned};

/// Persists new content for existing temporal entities
///
/// Each item carries the metadata of the version it supersedes and the new
/// content (see [`Versioned::with_data`]). For every item whose content hash
/// changed, the current version is closed and its successor inserted, in one
/// transaction. The close is guarded by an optimistic check that the
/// superseded version is still current; otherwise the whole batch fails with
/// a concurrent update error.
///
/// # Returns
/// * `Ok(Vec<Versioned<T>>)` - The current version of each item, in input order.
///   Unchanged items are returned as they were passed in.
/// * `Err` - Stale version, or the transaction could not be executed
#[async_trait]
pub trait SaveVersion<T: TemporalEntity>: Send + Sync {
    async fn save_versions(
        &self,
        items: Vec<Versioned<T>>,
        actor: Uuid,
    ) -> Result<Vec<Versioned<T>>, Box<dyn std::error::Error + Send + Sync>>;
}
