use chrono::NaiveDate;
use funeral_core_api::{ApiError, ApiResult};
use funeral_core_db::domain::{calculate_payroll, PayrollLine, TimesheetEntry};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::ports::{ErpBackend, PayrollRunRequest};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollRunResult {
    pub run_id: String,
    pub lines: Vec<PayrollLine>,
    pub total_gross: Decimal,
}

pub struct HrService {
    erp: Arc<dyn ErpBackend>,
}

impl HrService {
    pub fn new(erp: Arc<dyn ErpBackend>) -> Self {
        Self { erp }
    }

    /// Pure computation; nothing is sent to the ERP.
    pub fn calculate_payroll(&self, timesheets: &[TimesheetEntry]) -> ApiResult<Vec<PayrollLine>> {
        calculate_payroll(timesheets)
    }

    /// Computes gross pay for the period and submits it as one payroll run.
    pub async fn submit_payroll_run(
        &self,
        period_start: NaiveDate,
        period_end: NaiveDate,
        timesheets: &[TimesheetEntry],
    ) -> ApiResult<PayrollRunResult> {
        if period_end < period_start {
            return Err(ApiError::validation("payroll period ends before it starts"));
        }
        if let Some(outside) = timesheets
            .iter()
            .find(|t| t.work_date < period_start || t.work_date > period_end)
        {
            return Err(ApiError::validation(format!(
                "timesheet of {} on {} is outside the payroll period",
                outside.employee_id, outside.work_date
            )));
        }
        let lines = calculate_payroll(timesheets)?;
        if lines.is_empty() {
            return Err(ApiError::rule("no timesheets to pay for the period"));
        }
        let total_gross: Decimal = lines.iter().map(|l| l.gross_pay).sum();

        let run = self
            .erp
            .submit_payroll_run(&PayrollRunRequest {
                period_start,
                period_end,
                lines: lines.clone(),
                total_gross,
            })
            .await?;
        info!(run_id = %run.run_id, %period_start, %period_end, %total_gross, employees = lines.len(), "Payroll run submitted");
        Ok(PayrollRunResult {
            run_id: run.run_id,
            lines,
            total_gross,
        })
    }
}
