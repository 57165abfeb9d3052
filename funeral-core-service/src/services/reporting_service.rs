use chrono::{DateTime, Utc};
use funeral_core_api::{ApiError, ApiResult};
use funeral_core_db::domain::{case_financials, AgingBucket, CaseFinancials};
use funeral_core_db::models::case::{Case, CaseModel, CaseStatus};
use funeral_core_db::models::contract::{Contract, ContractStatus};
use funeral_core_db::models::payment::{Payment, PaymentKind, PaymentMethod, PaymentStatus};
use funeral_core_db::models::temporal::{parse_business_key, BusinessKey};
use funeral_core_db::repository::{
    CaseRepository, ContractRepository, FindCasesByStatus, FindContractsByCase, FindPaymentsByCase,
    FindPaymentsByDateRange, PaymentRepository,
};
use futures_util::{stream, StreamExt, TryStreamExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

use super::support::require_current;

/// Cases whose ledgers are loaded at the same time while aging receivables.
const AGING_CONCURRENCY: usize = 8;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RevenueLine {
    pub gross: Decimal,
    pub refunds: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevenueReport {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
    pub by_method: BTreeMap<PaymentMethod, RevenueLine>,
    pub total_net: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgingEntry {
    pub case_key: BusinessKey,
    pub case_number: String,
    pub balance_due: Decimal,
    pub days_outstanding: i64,
    pub bucket: AgingBucket,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArAgingReport {
    pub as_of: DateTime<Utc>,
    pub entries: Vec<AgingEntry>,
    pub totals: BTreeMap<AgingBucket, Decimal>,
    pub total_outstanding: Decimal,
}

/// Read-only financial views over cases, contracts and payments.
pub struct ReportingService {
    cases: Arc<dyn CaseRepository>,
    contracts: Arc<dyn ContractRepository>,
    payments: Arc<dyn PaymentRepository>,
}

impl ReportingService {
    pub fn new(
        cases: Arc<dyn CaseRepository>,
        contracts: Arc<dyn ContractRepository>,
        payments: Arc<dyn PaymentRepository>,
    ) -> Self {
        Self {
            cases,
            contracts,
            payments,
        }
    }

    async fn ledger(&self, case_key: &BusinessKey) -> ApiResult<(Vec<Contract>, Vec<Payment>)> {
        let (contracts, payments) = tokio::try_join!(
            self.contracts.find_contracts_by_case(case_key),
            self.payments.find_payments_by_case(case_key),
        )
        .map_err(ApiError::persistence)?;
        Ok((
            contracts.into_iter().map(|c| c.data).collect(),
            payments.into_iter().map(|p| p.data).collect(),
        ))
    }

    pub async fn case_financial_summary(&self, case_key: &str) -> ApiResult<CaseFinancials> {
        let key = parse_business_key(case_key)?;
        require_current::<Case, _>(&*self.cases, &key).await?;
        let (contracts, payments) = self.ledger(&key).await?;
        Ok(case_financials(&contracts, &payments))
    }

    /// Succeeded charges less succeeded refunds dated in `[from, to)`, per payment method.
    pub async fn revenue_report(&self, from: DateTime<Utc>, to: DateTime<Utc>) -> ApiResult<RevenueReport> {
        if to <= from {
            return Err(ApiError::validation("report end must be after its start"));
        }
        let payments = self
            .payments
            .find_payments_by_date_range(from, to)
            .await
            .map_err(ApiError::persistence)?;

        let mut by_method: BTreeMap<PaymentMethod, RevenueLine> = BTreeMap::new();
        for payment in payments.iter().map(|p| &p.data) {
            match (payment.kind, payment.status) {
                (PaymentKind::Charge, PaymentStatus::Succeeded | PaymentStatus::Refunded) => {
                    by_method.entry(payment.method).or_default().gross += payment.amount;
                }
                (PaymentKind::Refund, PaymentStatus::Succeeded) => {
                    by_method.entry(payment.method).or_default().refunds += payment.amount;
                }
                _ => {}
            }
        }
        for line in by_method.values_mut() {
            line.net = line.gross - line.refunds;
        }
        let total_net = by_method.values().map(|l| l.net).sum();
        debug!(%from, %to, payments = payments.len(), %total_net, "Revenue report computed");
        Ok(RevenueReport {
            from,
            to,
            by_method,
            total_net,
        })
    }

    /// Outstanding balances of Active and Completed cases, aged from the
    /// earliest signature of their signed contracts.
    pub async fn ar_aging(&self, as_of: DateTime<Utc>) -> ApiResult<ArAgingReport> {
        let cases = self
            .cases
            .find_cases_by_status(&[CaseStatus::Active, CaseStatus::Completed])
            .await
            .map_err(ApiError::persistence)?;

        let mut entries: Vec<AgingEntry> = stream::iter(cases)
            .map(|case| async move { self.aging_entry(case, as_of).await })
            .buffer_unordered(AGING_CONCURRENCY)
            .try_filter_map(|entry| async move { Ok(entry) })
            .try_collect()
            .await?;
        entries.sort_by(|a, b| {
            b.days_outstanding
                .cmp(&a.days_outstanding)
                .then_with(|| a.case_number.cmp(&b.case_number))
        });

        let mut totals: BTreeMap<AgingBucket, Decimal> = BTreeMap::new();
        for entry in &entries {
            *totals.entry(entry.bucket).or_insert(Decimal::ZERO) += entry.balance_due;
        }
        let total_outstanding = totals.values().copied().sum();
        Ok(ArAgingReport {
            as_of,
            entries,
            totals,
            total_outstanding,
        })
    }

    async fn aging_entry(&self, case: CaseModel, as_of: DateTime<Utc>) -> ApiResult<Option<AgingEntry>> {
        let (contracts, payments) = self.ledger(&case.meta.business_key).await?;
        let financials = case_financials(&contracts, &payments);
        if financials.balance_due <= Decimal::ZERO {
            return Ok(None);
        }
        let Some(billed_at) = contracts
            .iter()
            .filter(|c| c.status == ContractStatus::FullySigned)
            .filter_map(Contract::signed_at)
            .min()
        else {
            return Ok(None);
        };
        Ok(Some(AgingEntry {
            case_key: case.meta.business_key,
            case_number: case.data.case_number.to_string(),
            balance_due: financials.balance_due,
            days_outstanding: (as_of - billed_at).num_days(),
            bucket: AgingBucket::from_dates(billed_at, as_of),
        }))
    }
}
