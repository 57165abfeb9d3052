use async_trait::async_trait;
use chrono::NaiveDateTime;
use funeral_core_db::models::appointment::AppointmentModel;
use funeral_core_db::repository::FindAppointmentsByDirector;
use std::error::Error;
use uuid::Uuid;

use super::repo_impl::{AppointmentRepositoryImpl, APPOINTMENT_COLUMNS};
use crate::error::RepositoryError;
use crate::utils::TryFromRow;

#[async_trait]
impl FindAppointmentsByDirector for AppointmentRepositoryImpl {
    async fn find_appointments_by_director(
        &self,
        director_id: Uuid,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<AppointmentModel>, Box<dyn Error + Send + Sync>> {
        let sql = format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointment \
             WHERE director_id = $1 AND start_time >= $2 AND start_time < $3 ORDER BY start_time"
        );
        let rows = {
            let mut tx = self.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or(RepositoryError::TransactionConsumed)?;
            sqlx::query(&sql)
                .bind(director_id)
                .bind(from)
                .bind(to)
                .fetch_all(&mut **transaction)
                .await?
        };
        rows.iter().map(AppointmentModel::try_from_row).collect()
    }
}
