use funeral_core_db::models::policy::{PaymentPolicy, SchedulingPolicy};
use sqlx::{postgres::PgRow, Row};
use std::error::Error;

use crate::repository::temporal::{PgQuery, TemporalTable};
use crate::utils::get_u32;

impl TemporalTable for PaymentPolicy {
    const TABLE: &'static str = "payment_policy";
    const DATA_COLUMNS: &'static [&'static str] =
        &["max_refund_days", "refund_approval_threshold", "allow_partial_refunds"];

    fn bind_data<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.max_refund_days)
            .bind(self.refund_approval_threshold)
            .bind(self.allow_partial_refunds)
    }

    fn data_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        Ok(PaymentPolicy {
            max_refund_days: row.try_get("max_refund_days")?,
            refund_approval_threshold: row.try_get("refund_approval_threshold")?,
            allow_partial_refunds: row.try_get("allow_partial_refunds")?,
        })
    }
}

// hours and minutes always fit an INTEGER column
impl TemporalTable for SchedulingPolicy {
    const TABLE: &'static str = "scheduling_policy";
    const DATA_COLUMNS: &'static [&'static str] = &[
        "max_appointments_per_day",
        "day_start_hour",
        "day_end_hour",
        "lunch_hour",
        "slot_minutes",
    ];

    fn bind_data<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q> {
        query
            .bind(self.max_appointments_per_day)
            .bind(self.day_start_hour as i32)
            .bind(self.day_end_hour as i32)
            .bind(self.lunch_hour.map(|h| h as i32))
            .bind(self.slot_minutes as i32)
    }

    fn data_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let lunch_hour: Option<i32> = row.try_get("lunch_hour")?;
        Ok(SchedulingPolicy {
            max_appointments_per_day: row.try_get("max_appointments_per_day")?,
            day_start_hour: get_u32(row, "day_start_hour")?,
            day_end_hour: get_u32(row, "day_end_hour")?,
            lunch_hour: lunch_hour
                .map(|h| u32::try_from(h).map_err(|_| format!("Negative lunch hour {h}")))
                .transpose()?,
            slot_minutes: get_u32(row, "slot_minutes")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::test_helper::setup_test_context;
    use chrono::Utc;
    use funeral_core_db::models::policy::{SchedulingPolicy, SCHEDULING_POLICY_KEY};
    use funeral_core_db::models::temporal::{parse_business_key, Versioned};
    use funeral_core_db::repository::{CreateVersioned, FindCurrent};
    use uuid::Uuid;

    #[tokio::test]
    #[ignore]
    #[serial_test::serial]
    async fn test_scheduling_policy_round_trip() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let policies = &ctx.repos().scheduling_policies;
        let key = parse_business_key(SCHEDULING_POLICY_KEY)?;
        let policy = SchedulingPolicy {
            lunch_hour: None,
            slot_minutes: 30,
            ..SchedulingPolicy::default()
        };
        policies
            .create_versioned(vec![Versioned::create(key.clone(), policy.clone(), Uuid::new_v4(), Utc::now())?])
            .await?;
        let stored = policies.find_current(&key).await?.expect("policy stored");
        assert_eq!(stored.data, policy);
        Ok(())
    }
}
