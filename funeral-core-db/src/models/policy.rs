use funeral_core_api::{ApiError, ApiResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::temporal::{TemporalEntity, Versioned};

/// Business key under which the payment policy is stored.
pub const PAYMENT_POLICY_KEY: &str = "payment-policy";
/// Business key under which the scheduling policy is stored.
pub const SCHEDULING_POLICY_KEY: &str = "scheduling-policy";

/// Refund rules applied by the payments use cases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentPolicy {
    /// Refunds of payments older than this many days are rejected
    pub max_refund_days: i32,
    /// Refunds above this amount wait for manual approval
    pub refund_approval_threshold: Decimal,
    pub allow_partial_refunds: bool,
}

pub type PaymentPolicyModel = Versioned<PaymentPolicy>;

impl TemporalEntity for PaymentPolicy {
    const ENTITY: &'static str = "PaymentPolicy";
}

impl Default for PaymentPolicy {
    fn default() -> Self {
        Self {
            max_refund_days: 90,
            refund_approval_threshold: Decimal::new(100000, 2),
            allow_partial_refunds: true,
        }
    }
}

impl PaymentPolicy {
    pub fn validate(&self) -> ApiResult<()> {
        if self.max_refund_days < 0 {
            return Err(ApiError::validation("max_refund_days must not be negative"));
        }
        if self.refund_approval_threshold.is_sign_negative() && !self.refund_approval_threshold.is_zero() {
            return Err(ApiError::validation("refund_approval_threshold must not be negative"));
        }
        Ok(())
    }
}

/// Working-day shape used to offer appointment slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchedulingPolicy {
    pub max_appointments_per_day: i32,
    pub day_start_hour: u32,
    /// Slots end at or before this hour
    pub day_end_hour: u32,
    /// Hour kept free for lunch
    pub lunch_hour: Option<u32>,
    pub slot_minutes: u32,
}

pub type SchedulingPolicyModel = Versioned<SchedulingPolicy>;

impl TemporalEntity for SchedulingPolicy {
    const ENTITY: &'static str = "SchedulingPolicy";
}

impl Default for SchedulingPolicy {
    fn default() -> Self {
        Self {
            max_appointments_per_day: 4,
            day_start_hour: 9,
            day_end_hour: 17,
            lunch_hour: Some(12),
            slot_minutes: 60,
        }
    }
}

impl SchedulingPolicy {
    pub fn validate(&self) -> ApiResult<()> {
        if self.max_appointments_per_day < 1 {
            return Err(ApiError::validation("max_appointments_per_day must be at least 1"));
        }
        if self.day_start_hour >= self.day_end_hour || self.day_end_hour > 24 {
            return Err(ApiError::validation("working hours must satisfy start < end <= 24"));
        }
        if self.slot_minutes == 0 || self.slot_minutes > 240 || 60 % self.slot_minutes != 0 && self.slot_minutes % 60 != 0 {
            return Err(ApiError::validation("slot_minutes must divide or be a multiple of an hour, up to 240"));
        }
        if let Some(lunch) = self.lunch_hour {
            if lunch < self.day_start_hour || lunch >= self.day_end_hour {
                return Err(ApiError::validation("lunch_hour must fall within working hours"));
            }
        }
        Ok(())
    }
}
