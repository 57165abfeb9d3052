use chrono::Utc;
use funeral_core_api::{ApiError, ApiResult};
use funeral_core_db::models::case::{Case, CaseStatus};
use funeral_core_db::models::payment::{Payment, PaymentKind, PaymentModel, PaymentStatus};
use funeral_core_db::models::temporal::parse_business_key;
use funeral_core_db::models::temporal::BusinessKey;
use funeral_core_db::repository::{CaseRepository, FindPaymentsByCase, LoadHistory, Page, PageRequest, PaymentRepository};
use funeral_core_db::utils::{to_heapless, to_optional_heapless};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use super::policy_service::PolicyService;
use super::support::{create_one, first_version, require_current, save_one};
use crate::commands::{ProcessRefundCommand, RecordPaymentCommand};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefundOutcome {
    pub refund: PaymentModel,
    /// Original charge after the refund was applied; unchanged while approval is pending
    pub original: PaymentModel,
    pub requires_approval: bool,
}

/// Payment recording, processing and refunds.
pub struct PaymentService {
    payments: Arc<dyn PaymentRepository>,
    cases: Arc<dyn CaseRepository>,
    policies: Arc<PolicyService>,
}

impl PaymentService {
    pub fn new(
        payments: Arc<dyn PaymentRepository>,
        cases: Arc<dyn CaseRepository>,
        policies: Arc<PolicyService>,
    ) -> Self {
        Self {
            payments,
            cases,
            policies,
        }
    }

    pub async fn record_payment(&self, cmd: RecordPaymentCommand, actor: Uuid) -> ApiResult<PaymentModel> {
        cmd.validate()?;
        let case_key = parse_business_key(&cmd.case_key)?;
        let case = require_current::<Case, _>(&*self.cases, &case_key).await?;
        if case.data.status == CaseStatus::Archived {
            return Err(ApiError::rule(format!(
                "case {} is archived and accepts no payments",
                case.data.case_number
            )));
        }

        let now = Utc::now();
        let mut payment = Payment::new_charge(case_key, cmd.amount, cmd.method, cmd.payment_date.unwrap_or(now));
        payment.reference = to_optional_heapless(cmd.reference.as_deref(), "reference")?;
        payment.notes = to_optional_heapless(cmd.notes.as_deref(), "notes")?;

        let saved = create_one(&*self.payments, first_version(payment, actor, now)?).await?;
        info!(
            payment = %saved.meta.business_key,
            case = %saved.data.case_key,
            amount = %saved.data.amount,
            "Payment recorded"
        );
        Ok(saved)
    }

    async fn transition<F>(&self, payment_key: &str, actor: Uuid, step: F) -> ApiResult<PaymentModel>
    where
        F: FnOnce(&Payment) -> ApiResult<Payment>,
    {
        let key = parse_business_key(payment_key)?;
        let current = require_current::<Payment, _>(&*self.payments, &key).await?;
        let next = step(&current.data)?;
        let saved = save_one(&*self.payments, &current, next, actor).await?;
        info!(payment = %key, from = %current.data.status, to = %saved.data.status, "Payment status changed");
        Ok(saved)
    }

    pub async fn start_processing(&self, payment_key: &str, actor: Uuid) -> ApiResult<PaymentModel> {
        self.transition(payment_key, actor, Payment::mark_processing).await
    }

    pub async fn confirm_payment(&self, payment_key: &str, actor: Uuid) -> ApiResult<PaymentModel> {
        self.transition(payment_key, actor, Payment::mark_succeeded).await
    }

    pub async fn fail_payment(&self, payment_key: &str, reason: &str, actor: Uuid) -> ApiResult<PaymentModel> {
        let reason = to_heapless::<255>(reason, "failure_reason")?;
        self.transition(payment_key, actor, |p| p.mark_failed(reason)).await
    }

    pub async fn cancel_payment(&self, payment_key: &str, actor: Uuid) -> ApiResult<PaymentModel> {
        self.transition(payment_key, actor, Payment::cancel).await
    }

    /// Refunds all or part of a succeeded charge.
    ///
    /// Refunds above the policy's approval threshold are stored Pending and
    /// leave the original untouched until [`approve_refund`](Self::approve_refund).
    pub async fn process_refund(&self, cmd: ProcessRefundCommand, actor: Uuid) -> ApiResult<RefundOutcome> {
        cmd.validate()?;
        let payment_key = parse_business_key(&cmd.payment_key)?;
        let original = require_current::<Payment, _>(&*self.payments, &payment_key).await?;
        if original.data.kind != PaymentKind::Charge {
            return Err(ApiError::rule("a refund cannot itself be refunded"));
        }
        if original.data.status != PaymentStatus::Succeeded {
            return Err(ApiError::rule(format!(
                "only succeeded payments can be refunded (status {})",
                original.data.status
            )));
        }

        let policy = self.policies.payment_policy().await?;
        let held = self.held_refunds(&payment_key, &original.data.case_key).await?;
        let refundable = (original.data.refundable_amount() - held).max(Decimal::ZERO);
        let amount = cmd.refund_amount.unwrap_or(refundable);
        if amount <= Decimal::ZERO {
            return Err(ApiError::validation("refund amount must be greater than zero"));
        }
        if amount > original.data.amount {
            return Err(ApiError::validation(format!(
                "refund amount {amount} exceeds original amount {}",
                original.data.amount
            )));
        }
        if amount > refundable {
            return Err(ApiError::validation(format!(
                "refund amount {amount} exceeds remaining refundable amount {refundable}"
            )));
        }
        if amount < refundable && !policy.allow_partial_refunds {
            return Err(ApiError::validation("partial refunds are disabled by policy"));
        }

        let now = Utc::now();
        let age = original.data.age_in_days(now);
        if age > i64::from(policy.max_refund_days) {
            return Err(ApiError::validation(format!(
                "payment is {age} days old; refunds are allowed for {} days",
                policy.max_refund_days
            )));
        }

        let notes = to_heapless::<500>(&cmd.reason, "reason")?;
        let refund = Payment::new_refund(payment_key.clone(), &original.data, amount, now, Some(notes));
        let refund = create_one(&*self.payments, first_version(refund, actor, now)?).await?;

        if amount > policy.refund_approval_threshold {
            warn!(
                payment = %payment_key,
                refund = %refund.meta.business_key,
                %amount,
                threshold = %policy.refund_approval_threshold,
                "Refund requires approval"
            );
            return Ok(RefundOutcome {
                refund,
                original,
                requires_approval: true,
            });
        }

        let (refund, original) = self.complete_refund(refund, original, actor).await?;
        Ok(RefundOutcome {
            refund,
            original,
            requires_approval: false,
        })
    }

    /// Total of refunds against `payment_key` that are still awaiting approval or completion.
    async fn held_refunds(&self, payment_key: &BusinessKey, case_key: &BusinessKey) -> ApiResult<Decimal> {
        let payments = self
            .payments
            .find_payments_by_case(case_key)
            .await
            .map_err(ApiError::persistence)?;
        Ok(payments
            .iter()
            .map(|p| &p.data)
            .filter(|p| p.kind == PaymentKind::Refund)
            .filter(|p| matches!(p.status, PaymentStatus::Pending | PaymentStatus::Processing))
            .filter(|p| p.original_payment_key.as_ref() == Some(payment_key))
            .map(|p| p.amount)
            .sum())
    }

    /// Completes a refund that was held for approval.
    pub async fn approve_refund(&self, refund_key: &str, actor: Uuid) -> ApiResult<RefundOutcome> {
        let key = parse_business_key(refund_key)?;
        let refund = require_current::<Payment, _>(&*self.payments, &key).await?;
        if refund.data.kind != PaymentKind::Refund {
            return Err(ApiError::rule(format!("payment {key} is not a refund")));
        }
        let original_key = refund
            .data
            .original_payment_key
            .clone()
            .ok_or_else(|| ApiError::rule(format!("refund {key} has no original payment")))?;
        let original = require_current::<Payment, _>(&*self.payments, &original_key).await?;
        let (refund, original) = self.complete_refund(refund, original, actor).await?;
        Ok(RefundOutcome {
            refund,
            original,
            requires_approval: false,
        })
    }

    /// Drives the refund Pending -> Processing -> Succeeded and applies it to the original.
    async fn complete_refund(
        &self,
        refund: PaymentModel,
        original: PaymentModel,
        actor: Uuid,
    ) -> ApiResult<(PaymentModel, PaymentModel)> {
        // validate every step before the first write
        let processing = refund.data.mark_processing()?;
        let succeeded = processing.mark_succeeded()?;
        let applied = original.data.apply_refund(refund.data.amount)?;

        let refund = save_one(&*self.payments, &refund, processing, actor).await?;
        let refund = save_one(&*self.payments, &refund, succeeded, actor).await?;
        let original = save_one(&*self.payments, &original, applied, actor).await?;
        info!(
            payment = %original.meta.business_key,
            refund = %refund.meta.business_key,
            amount = %refund.data.amount,
            status = %original.data.status,
            "Refund completed"
        );
        Ok((refund, original))
    }

    pub async fn payment_history(&self, payment_key: &str, page: PageRequest) -> ApiResult<Page<PaymentModel>> {
        let key = parse_business_key(payment_key)?;
        let history = self.payments.load_history(&key, page).await.map_err(ApiError::persistence)?;
        if history.total == 0 {
            return Err(ApiError::not_found("Payment", key));
        }
        Ok(history)
    }
}
