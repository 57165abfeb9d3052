use async_trait::async_trait;

use crate::models::identifiable::Identifiable;

/// Generic repository trait for creating multiple non-versioned entities in a batch
///
/// All creates are performed within a single transaction for atomicity.
/// Returns saved items with any generated fields populated.
///
/// # Example
/// ```ignore
/// impl CreateBatch<AppointmentModel> for AppointmentRepositoryImpl {
///     async fn create_batch(&self, items: Vec<AppointmentModel>) -> Result<Vec<AppointmentModel>, Box<dyn Error + Send + Sync>> {
///         // Implementation
///     }
/// }
/// ```
#[async_trait]
pub trait CreateBatch<T: Identifiable>: Send + Sync {
    /// Save multiple items in a single transaction
    async fn create_batch(&self, items: Vec<T>) -> Result<Vec<T>, Box<dyn std::error::Error + Send + Sync>>;
}
