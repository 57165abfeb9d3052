use async_trait::async_trait;
use chrono::{DateTime, Utc};
use funeral_core_db::models::payment::{Payment, PaymentModel};
use funeral_core_db::models::temporal::BusinessKey;
use funeral_core_db::repository::{FindPaymentsByCase, FindPaymentsByDateRange};
use sqlx::{postgres::PgRow, Row};
use std::error::Error;

use crate::repository::temporal::{PgQuery, TemporalRepositoryImpl, TemporalTable};
use crate::utils::{get_heapless_string, get_optional_heapless_string};

impl TemporalTable for Payment {
    const TABLE: &'static str = "payment";
    const DATA_COLUMNS: &'static [&'static str] = &[
        "case_key",
        "amount",
        "method",
        "kind",
        "status",
        "payment_date",
        "reference",
        "original_payment_key",
        "refunded_amount",
        "failure_reason",
        "notes",
    ];

    fn bind_data<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.case_key.to_string())
            .bind(self.amount)
            .bind(self.method)
            .bind(self.kind)
            .bind(self.status)
            .bind(self.payment_date)
            .bind(self.reference.as_ref().map(|s| s.to_string()))
            .bind(self.original_payment_key.as_ref().map(|s| s.to_string()))
            .bind(self.refunded_amount)
            .bind(self.failure_reason.as_ref().map(|s| s.to_string()))
            .bind(self.notes.as_ref().map(|s| s.to_string()))
    }

    fn data_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(Payment {
            case_key: get_heapless_string(row, "case_key")?,
            amount: row.try_get("amount")?,
            method: row.try_get("method")?,
            kind: row.try_get("kind")?,
            status: row.try_get("status")?,
            payment_date: row.try_get("payment_date")?,
            reference: get_optional_heapless_string(row, "reference")?,
            original_payment_key: get_optional_heapless_string(row, "original_payment_key")?,
            refunded_amount: row.try_get("refunded_amount")?,
            failure_reason: get_optional_heapless_string(row, "failure_reason")?,
            notes: get_optional_heapless_string(row, "notes")?,
        })
    }
}

#[async_trait]
impl FindPaymentsByCase for TemporalRepositoryImpl<Payment> {
    async fn find_payments_by_case(
        &self,
        case_key: &BusinessKey,
    ) -> Result<Vec<PaymentModel>, Box<dyn Error + Send + Sync>> {
        let case_key = case_key.to_string();
        self.fetch_where("is_current AND case_key = $1 ORDER BY payment_date", |q| q.bind(case_key))
            .await
    }
}

#[async_trait]
impl FindPaymentsByDateRange for TemporalRepositoryImpl<Payment> {
    async fn find_payments_by_date_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PaymentModel>, Box<dyn Error + Send + Sync>> {
        self.fetch_where(
            "is_current AND payment_date >= $1 AND payment_date < $2 ORDER BY payment_date",
            |q| q.bind(from).bind(to),
        )
        .await
    }
}
