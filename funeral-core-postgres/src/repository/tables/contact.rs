use async_trait::async_trait;
use funeral_core_db::models::contact::{Contact, ContactModel};
use funeral_core_db::models::temporal::BusinessKey;
use funeral_core_db::repository::FindContactsByCase;
use sqlx::{postgres::PgRow, Row};
use std::error::Error;

use crate::repository::temporal::{PgQuery, TemporalRepositoryImpl, TemporalTable};
use crate::utils::{get_heapless_string, get_optional_heapless_string};

impl TemporalTable for Contact {
    const TABLE: &'static str = "contact";
    const DATA_COLUMNS: &'static [&'static str] = &[
        "first_name",
        "last_name",
        "email",
        "phone",
        "relationship",
        "case_key",
        "address",
        "notes",
    ];

    fn bind_data<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.first_name.to_string())
            .bind(self.last_name.to_string())
            .bind(self.email.as_ref().map(|s| s.to_string()))
            .bind(self.phone.as_ref().map(|s| s.to_string()))
            .bind(self.relationship)
            .bind(self.case_key.as_ref().map(|s| s.to_string()))
            .bind(self.address.as_ref().map(|s| s.to_string()))
            .bind(self.notes.as_ref().map(|s| s.to_string()))
    }

    fn data_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(Contact {
            first_name: get_heapless_string(row, "first_name")?,
            last_name: get_heapless_string(row, "last_name")?,
            email: get_optional_heapless_string(row, "email")?,
            phone: get_optional_heapless_string(row, "phone")?,
            relationship: row.try_get("relationship")?,
            case_key: get_optional_heapless_string(row, "case_key")?,
            address: get_optional_heapless_string(row, "address")?,
            notes: get_optional_heapless_string(row, "notes")?,
        })
    }
}

#[async_trait]
impl FindContactsByCase for TemporalRepositoryImpl<Contact> {
    async fn find_contacts_by_case(
        &self,
        case_key: &BusinessKey,
    ) -> Result<Vec<ContactModel>, Box<dyn Error + Send + Sync>> {
        let case_key = case_key.to_string();
        self.fetch_where("is_current AND case_key = $1 ORDER BY last_name, first_name", |q| {
            q.bind(case_key)
        })
        .await
    }
}
