use chrono::{DateTime, Utc};
use funeral_core_api::{ApiError, ApiResult};
use heapless::String as HeaplessString;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::temporal::{BusinessKey, TemporalEntity, Versioned};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "payment_status", rename_all = "PascalCase"))]
pub enum PaymentStatus {
    Pending,
    Processing,
    Succeeded,
    Failed,
    Cancelled,
    Refunded,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Pending => write!(f, "Pending"),
            PaymentStatus::Processing => write!(f, "Processing"),
            PaymentStatus::Succeeded => write!(f, "Succeeded"),
            PaymentStatus::Failed => write!(f, "Failed"),
            PaymentStatus::Cancelled => write!(f, "Cancelled"),
            PaymentStatus::Refunded => write!(f, "Refunded"),
        }
    }
}

impl FromStr for PaymentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(PaymentStatus::Pending),
            "Processing" => Ok(PaymentStatus::Processing),
            "Succeeded" => Ok(PaymentStatus::Succeeded),
            "Failed" => Ok(PaymentStatus::Failed),
            "Cancelled" => Ok(PaymentStatus::Cancelled),
            "Refunded" => Ok(PaymentStatus::Refunded),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "payment_method", rename_all = "PascalCase"))]
pub enum PaymentMethod {
    Cash,
    Check,
    CreditCard,
    DebitCard,
    Ach,
    InsuranceAssignment,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "Cash"),
            PaymentMethod::Check => write!(f, "Check"),
            PaymentMethod::CreditCard => write!(f, "CreditCard"),
            PaymentMethod::DebitCard => write!(f, "DebitCard"),
            PaymentMethod::Ach => write!(f, "Ach"),
            PaymentMethod::InsuranceAssignment => write!(f, "InsuranceAssignment"),
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Cash" => Ok(PaymentMethod::Cash),
            "Check" => Ok(PaymentMethod::Check),
            "CreditCard" => Ok(PaymentMethod::CreditCard),
            "DebitCard" => Ok(PaymentMethod::DebitCard),
            "Ach" => Ok(PaymentMethod::Ach),
            "InsuranceAssignment" => Ok(PaymentMethod::InsuranceAssignment),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "payment_kind", rename_all = "PascalCase"))]
pub enum PaymentKind {
    Charge,
    Refund,
}

/// Money received against a case, or returned through a refund.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub case_key: BusinessKey,
    /// Always positive; refunds are distinguished by `kind`
    pub amount: Decimal,
    pub method: PaymentMethod,
    pub kind: PaymentKind,
    pub status: PaymentStatus,
    pub payment_date: DateTime<Utc>,
    /// Check number, card authorization, ACH trace
    pub reference: Option<HeaplessString<100>>,
    /// Set on refunds, references the refunded charge
    pub original_payment_key: Option<BusinessKey>,
    /// Portion of a charge already returned through succeeded refunds
    pub refunded_amount: Decimal,
    pub failure_reason: Option<HeaplessString<255>>,
    pub notes: Option<HeaplessString<500>>,
}

pub type PaymentModel = Versioned<Payment>;

impl TemporalEntity for Payment {
    const ENTITY: &'static str = "Payment";
}

impl Payment {
    pub fn new_charge(
        case_key: BusinessKey,
        amount: Decimal,
        method: PaymentMethod,
        payment_date: DateTime<Utc>,
    ) -> Self {
        Self {
            case_key,
            amount,
            method,
            kind: PaymentKind::Charge,
            status: PaymentStatus::Pending,
            payment_date,
            reference: None,
            original_payment_key: None,
            refunded_amount: Decimal::ZERO,
            failure_reason: None,
            notes: None,
        }
    }

    /// A pending refund of `amount` against `original`.
    pub fn new_refund(
        original_key: BusinessKey,
        original: &Payment,
        amount: Decimal,
        payment_date: DateTime<Utc>,
        notes: Option<HeaplessString<500>>,
    ) -> Self {
        Self {
            case_key: original.case_key.clone(),
            amount,
            method: original.method,
            kind: PaymentKind::Refund,
            status: PaymentStatus::Pending,
            payment_date,
            reference: original.reference.clone(),
            original_payment_key: Some(original_key),
            refunded_amount: Decimal::ZERO,
            failure_reason: None,
            notes,
        }
    }

    fn transition(&self, allowed_from: &[PaymentStatus], to: PaymentStatus) -> ApiResult<Self> {
        if !allowed_from.contains(&self.status) {
            return Err(ApiError::transition(Self::ENTITY, self.status, to));
        }
        let mut next = self.clone();
        next.status = to;
        Ok(next)
    }

    pub fn mark_processing(&self) -> ApiResult<Self> {
        self.transition(&[PaymentStatus::Pending], PaymentStatus::Processing)
    }

    pub fn mark_succeeded(&self) -> ApiResult<Self> {
        self.transition(&[PaymentStatus::Processing], PaymentStatus::Succeeded)
    }

    pub fn mark_failed(&self, reason: HeaplessString<255>) -> ApiResult<Self> {
        let mut next = self.transition(
            &[PaymentStatus::Pending, PaymentStatus::Processing],
            PaymentStatus::Failed,
        )?;
        next.failure_reason = Some(reason);
        Ok(next)
    }

    pub fn cancel(&self) -> ApiResult<Self> {
        self.transition(&[PaymentStatus::Pending], PaymentStatus::Cancelled)
    }

    /// Amount of a succeeded charge that may still be refunded.
    pub fn refundable_amount(&self) -> Decimal {
        match (self.kind, self.status) {
            (PaymentKind::Charge, PaymentStatus::Succeeded) => self.amount - self.refunded_amount,
            _ => Decimal::ZERO,
        }
    }

    /// Records a completed refund against this charge.
    ///
    /// The charge stays `Succeeded` while partially refunded and becomes
    /// `Refunded` once the whole amount has been returned.
    pub fn apply_refund(&self, amount: Decimal) -> ApiResult<Self> {
        if self.status != PaymentStatus::Succeeded || self.kind != PaymentKind::Charge {
            return Err(ApiError::transition(Self::ENTITY, self.status, PaymentStatus::Refunded));
        }
        if amount <= Decimal::ZERO || amount > self.refundable_amount() {
            return Err(ApiError::validation(format!(
                "refund amount {amount} exceeds refundable amount {}",
                self.refundable_amount()
            )));
        }
        let mut next = self.clone();
        next.refunded_amount += amount;
        if next.refunded_amount == next.amount {
            next.status = PaymentStatus::Refunded;
        }
        Ok(next)
    }

    /// Contribution of this payment to a case balance: charges add, refunds subtract.
    pub fn net_received(&self) -> Decimal {
        match (self.kind, self.status) {
            (PaymentKind::Charge, PaymentStatus::Succeeded | PaymentStatus::Refunded) => self.amount,
            (PaymentKind::Refund, PaymentStatus::Succeeded) => -self.amount,
            _ => Decimal::ZERO,
        }
    }

    /// Whole days between the payment date and `now`.
    pub fn age_in_days(&self, now: DateTime<Utc>) -> i64 {
        (now - self.payment_date).num_days()
    }
}
