use async_trait::async_trait;
use funeral_core_db::models::contract::{Contract, ContractLineItem, ContractModel};
use funeral_core_db::models::temporal::BusinessKey;
use funeral_core_db::repository::FindContractsByCase;
use sqlx::types::Json;
use sqlx::{postgres::PgRow, Row};
use std::error::Error;

use crate::repository::temporal::{PgQuery, TemporalRepositoryImpl, TemporalTable};
use crate::utils::{get_heapless_string, get_optional_heapless_string};

impl TemporalTable for Contract {
    const TABLE: &'static str = "contract";
    const DATA_COLUMNS: &'static [&'static str] = &[
        "case_key",
        "line_items",
        "tax_rate",
        "status",
        "family_signed_at",
        "director_signed_at",
        "signature_envelope_id",
        "erp_contract_id",
        "cogs_journal_entry_id",
    ];

    fn bind_data<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.case_key.to_string())
            .bind(Json(self.line_items.clone()))
            .bind(self.tax_rate)
            .bind(self.status)
            .bind(self.family_signed_at)
            .bind(self.director_signed_at)
            .bind(self.signature_envelope_id.as_ref().map(|s| s.to_string()))
            .bind(self.erp_contract_id.as_ref().map(|s| s.to_string()))
            .bind(self.cogs_journal_entry_id.as_ref().map(|s| s.to_string()))
    }

    fn data_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let Json(line_items): Json<Vec<ContractLineItem>> = row.try_get("line_items")?;
        Ok(Contract {
            case_key: get_heapless_string(row, "case_key")?,
            line_items,
            tax_rate: row.try_get("tax_rate")?,
            status: row.try_get("status")?,
            family_signed_at: row.try_get("family_signed_at")?,
            director_signed_at: row.try_get("director_signed_at")?,
            signature_envelope_id: get_optional_heapless_string(row, "signature_envelope_id")?,
            erp_contract_id: get_optional_heapless_string(row, "erp_contract_id")?,
            cogs_journal_entry_id: get_optional_heapless_string(row, "cogs_journal_entry_id")?,
        })
    }
}

#[async_trait]
impl FindContractsByCase for TemporalRepositoryImpl<Contract> {
    async fn find_contracts_by_case(
        &self,
        case_key: &BusinessKey,
    ) -> Result<Vec<ContractModel>, Box<dyn Error + Send + Sync>> {
        let case_key = case_key.to_string();
        self.fetch_where("is_current AND case_key = $1 ORDER BY created_at", |q| q.bind(case_key))
            .await
    }
}
