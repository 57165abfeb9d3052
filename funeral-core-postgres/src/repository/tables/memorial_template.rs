use async_trait::async_trait;
use funeral_core_db::models::memorial_template::{MemorialTemplate, MemorialTemplateModel, TemplateCategory, TemplateStatus};
use funeral_core_db::repository::FindActiveTemplateByCategory;
use sqlx::{postgres::PgRow, Row};
use std::error::Error;

use crate::repository::temporal::{PgQuery, TemporalRepositoryImpl, TemporalTable};
use crate::utils::get_heapless_string;

impl TemporalTable for MemorialTemplate {
    const TABLE: &'static str = "memorial_template";
    const DATA_COLUMNS: &'static [&'static str] = &["name", "category", "body", "status"];

    fn bind_data<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.name.to_string())
            .bind(self.category)
            .bind(self.body.clone())
            .bind(self.status)
    }

    fn data_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(MemorialTemplate {
            name: get_heapless_string(row, "name")?,
            category: row.try_get("category")?,
            body: row.try_get("body")?,
            status: row.try_get("status")?,
        })
    }
}

#[async_trait]
impl FindActiveTemplateByCategory for TemporalRepositoryImpl<MemorialTemplate> {
    async fn find_active_template_by_category(
        &self,
        category: TemplateCategory,
    ) -> Result<Option<MemorialTemplateModel>, Box<dyn Error + Send + Sync>> {
        let mut rows = self
            .fetch_where(
                "is_current AND category = $1 AND status = $2 ORDER BY valid_from DESC LIMIT 1",
                |q| q.bind(category).bind(TemplateStatus::Active),
            )
            .await?;
        Ok(rows.pop())
    }
}
