use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::contract::{Contract, ContractStatus};
use crate::models::payment::{Payment, PaymentKind, PaymentStatus};

/// Money position of one case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseFinancials {
    /// Sum of fully signed contract totals
    pub contract_total: Decimal,
    /// Succeeded charges, including ones later refunded
    pub payments_received: Decimal,
    /// Succeeded refunds
    pub refunds: Decimal,
    pub balance_due: Decimal,
}

pub fn case_financials(contracts: &[Contract], payments: &[Payment]) -> CaseFinancials {
    let contract_total: Decimal = contracts
        .iter()
        .filter(|c| c.status == ContractStatus::FullySigned)
        .map(Contract::total)
        .sum();
    let payments_received: Decimal = payments
        .iter()
        .filter(|p| p.kind == PaymentKind::Charge)
        .map(Payment::net_received)
        .sum();
    let refunds: Decimal = payments
        .iter()
        .filter(|p| p.kind == PaymentKind::Refund && p.status == PaymentStatus::Succeeded)
        .map(|p| p.amount)
        .sum();
    CaseFinancials {
        contract_total,
        payments_received,
        refunds,
        balance_due: contract_total - payments_received + refunds,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgingBucket {
    Current,
    Days31To60,
    Days61To90,
    Over90,
}

impl AgingBucket {
    pub fn for_age(days: i64) -> Self {
        match days {
            i64::MIN..=30 => AgingBucket::Current,
            31..=60 => AgingBucket::Days31To60,
            61..=90 => AgingBucket::Days61To90,
            _ => AgingBucket::Over90,
        }
    }

    pub fn from_dates(billed_at: DateTime<Utc>, as_of: DateTime<Utc>) -> Self {
        Self::for_age((as_of - billed_at).num_days())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::contract::ContractLineItem;
    use crate::models::payment::PaymentMethod;
    use crate::models::temporal::parse_business_key;
    use chrono::Duration;
    use heapless::String as HeaplessString;

    fn signed_contract(amount: i64) -> Contract {
        let mut c = Contract::draft(
            parse_business_key("case-1").unwrap(),
            Decimal::ZERO,
            vec![ContractLineItem {
                description: HeaplessString::try_from("Services").unwrap(),
                quantity: 1,
                unit_price: Decimal::from(amount),
                taxable: false,
                inventory_sku: None,
            }],
        )
        .unwrap();
        c.status = ContractStatus::FullySigned;
        c
    }

    fn payment(kind: PaymentKind, status: PaymentStatus, amount: i64) -> Payment {
        let mut p = Payment::new_charge(
            parse_business_key("case-1").unwrap(),
            Decimal::from(amount),
            PaymentMethod::Check,
            Utc::now(),
        );
        p.kind = kind;
        p.status = status;
        p
    }

    #[test]
    fn test_case_financials() {
        let mut draft = signed_contract(999);
        draft.status = ContractStatus::Draft;
        let contracts = vec![signed_contract(5000), draft];
        let payments = vec![
            payment(PaymentKind::Charge, PaymentStatus::Succeeded, 3000),
            payment(PaymentKind::Charge, PaymentStatus::Refunded, 500),
            payment(PaymentKind::Refund, PaymentStatus::Succeeded, 500),
            payment(PaymentKind::Charge, PaymentStatus::Failed, 1000),
            payment(PaymentKind::Refund, PaymentStatus::Pending, 200),
        ];
        let f = case_financials(&contracts, &payments);
        assert_eq!(f.contract_total, Decimal::from(5000));
        assert_eq!(f.payments_received, Decimal::from(3500));
        assert_eq!(f.refunds, Decimal::from(500));
        assert_eq!(f.balance_due, Decimal::from(2000));
    }

    #[test]
    fn test_aging_buckets() {
        assert_eq!(AgingBucket::for_age(0), AgingBucket::Current);
        assert_eq!(AgingBucket::for_age(30), AgingBucket::Current);
        assert_eq!(AgingBucket::for_age(31), AgingBucket::Days31To60);
        assert_eq!(AgingBucket::for_age(90), AgingBucket::Days61To90);
        assert_eq!(AgingBucket::for_age(91), AgingBucket::Over90);
        let now = Utc::now();
        assert_eq!(AgingBucket::from_dates(now - Duration::days(45), now), AgingBucket::Days31To60);
    }
}
