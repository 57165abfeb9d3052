use async_trait::async_trait;
use funeral_core_db::models::appointment::AppointmentModel;
use funeral_core_db::repository::LoadBatch;
use std::collections::HashMap;
use std::error::Error;
use uuid::Uuid;

use super::repo_impl::{AppointmentRepositoryImpl, APPOINTMENT_COLUMNS};
use crate::error::RepositoryError;
use crate::utils::TryFromRow;

#[async_trait]
impl LoadBatch<AppointmentModel> for AppointmentRepositoryImpl {
    async fn load_batch(&self, ids: &[Uuid]) -> Result<Vec<Option<AppointmentModel>>, Box<dyn Error + Send + Sync>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!("SELECT {APPOINTMENT_COLUMNS} FROM appointment WHERE id = ANY($1)");
        let rows = {
            let mut tx = self.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or(RepositoryError::TransactionConsumed)?;
            sqlx::query(&sql).bind(ids).fetch_all(&mut **transaction).await?
        };

        let mut by_id = HashMap::with_capacity(rows.len());
        for row in &rows {
            let item = AppointmentModel::try_from_row(row)?;
            by_id.insert(item.id, item);
        }
        Ok(ids.iter().map(|id| by_id.get(id).cloned()).collect())
    }
}
