use async_trait::async_trait;
use funeral_core_db::models::appointment::AppointmentModel;
use funeral_core_db::repository::CreateBatch;
use std::error::Error;

use super::repo_impl::AppointmentRepositoryImpl;
use crate::error::RepositoryError;

impl AppointmentRepositoryImpl {
    pub(super) async fn create_batch_impl(
        repo: &AppointmentRepositoryImpl,
        items: Vec<AppointmentModel>,
    ) -> Result<Vec<AppointmentModel>, Box<dyn Error + Send + Sync>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or(RepositoryError::TransactionConsumed)?;
        for item in &items {
            sqlx::query(
                r#"
                INSERT INTO appointment (id, director_id, case_key, start_time, end_time, kind, status, title)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(item.id)
            .bind(item.director_id)
            .bind(item.case_key.as_ref().map(|s| s.as_str()))
            .bind(item.start_time)
            .bind(item.end_time)
            .bind(item.kind)
            .bind(item.status)
            .bind(item.title.as_str())
            .execute(&mut **transaction)
            .await?;
        }
        Ok(items)
    }
}

#[async_trait]
impl CreateBatch<AppointmentModel> for AppointmentRepositoryImpl {
    async fn create_batch(
        &self,
        items: Vec<AppointmentModel>,
    ) -> Result<Vec<AppointmentModel>, Box<dyn Error + Send + Sync>> {
        Self::create_batch_impl(self, items).await
    }
}
