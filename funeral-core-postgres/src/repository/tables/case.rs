use async_trait::async_trait;
use funeral_core_db::models::case::{Case, CaseModel, CaseStatus};
use funeral_core_db::repository::FindCasesByStatus;
use sqlx::{postgres::PgRow, Row};
use std::error::Error;

use crate::repository::temporal::{PgQuery, TemporalRepositoryImpl, TemporalTable};
use crate::utils::{get_heapless_string, get_optional_heapless_string};

impl TemporalTable for Case {
    const TABLE: &'static str = "funeral_case";
    const DATA_COLUMNS: &'static [&'static str] = &[
        "case_number",
        "decedent_name",
        "date_of_birth",
        "date_of_death",
        "service_type",
        "service_date",
        "funeral_director_id",
        "funeral_director_name",
        "primary_contact_key",
        "status",
        "finalized_at",
    ];

    fn bind_data<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.case_number.to_string())
            .bind(self.decedent_name.to_string())
            .bind(self.date_of_birth)
            .bind(self.date_of_death)
            .bind(self.service_type)
            .bind(self.service_date)
            .bind(self.funeral_director_id)
            .bind(self.funeral_director_name.as_ref().map(|s| s.to_string()))
            .bind(self.primary_contact_key.as_ref().map(|s| s.to_string()))
            .bind(self.status)
            .bind(self.finalized_at)
    }

    fn data_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(Case {
            case_number: get_heapless_string(row, "case_number")?,
            decedent_name: get_heapless_string(row, "decedent_name")?,
            date_of_birth: row.try_get("date_of_birth")?,
            date_of_death: row.try_get("date_of_death")?,
            service_type: row.try_get("service_type")?,
            service_date: row.try_get("service_date")?,
            funeral_director_id: row.try_get("funeral_director_id")?,
            funeral_director_name: get_optional_heapless_string(row, "funeral_director_name")?,
            primary_contact_key: get_optional_heapless_string(row, "primary_contact_key")?,
            status: row.try_get("status")?,
            finalized_at: row.try_get("finalized_at")?,
        })
    }
}

#[async_trait]
impl FindCasesByStatus for TemporalRepositoryImpl<Case> {
    async fn find_cases_by_status(
        &self,
        statuses: &[CaseStatus],
    ) -> Result<Vec<CaseModel>, Box<dyn Error + Send + Sync>> {
        let statuses: Vec<String> = statuses.iter().map(ToString::to_string).collect();
        self.fetch_where("is_current AND status::text = ANY($1) ORDER BY case_number", |q| {
            q.bind(statuses)
        })
        .await
    }
}
