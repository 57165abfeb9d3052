use async_trait::async_trait;

use crate::models::temporal::{TemporalEntity, Versioned};

/// Inserts version 1 of new temporal entities
///
/// Items are expected to come from [`Versioned::create`]. All inserts run in
/// one transaction; a business key that already has a version is an error.
///
/// # Example
/// ```ignore
/// let case = CaseModel::create(new_business_key(), case, actor, Utc::now())?;
/// let saved = repo.create_versioned(vec![case]).await?;
/// ```
#[async_trait]
pub trait CreateVersioned<T: TemporalEntity>: Send + Sync {
    async fn create_versioned(
        &self,
        items: Vec<Versioned<T>>,
    ) -> Result<Vec<Versioned<T>>, Box<dyn std::error::Error + Send + Sync>>;
}
