use chrono::{DateTime, Utc};
use funeral_core_api::{ApiError, ApiResult};
use heapless::String as HeaplessString;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::temporal::{BusinessKey, TemporalEntity, Versioned};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "contract_status", rename_all = "PascalCase"))]
pub enum ContractStatus {
    Draft,
    PendingSignature,
    FullySigned,
    Cancelled,
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractStatus::Draft => write!(f, "Draft"),
            ContractStatus::PendingSignature => write!(f, "PendingSignature"),
            ContractStatus::FullySigned => write!(f, "FullySigned"),
            ContractStatus::Cancelled => write!(f, "Cancelled"),
        }
    }
}

impl FromStr for ContractStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Draft" => Ok(ContractStatus::Draft),
            "PendingSignature" => Ok(ContractStatus::PendingSignature),
            "FullySigned" => Ok(ContractStatus::FullySigned),
            "Cancelled" => Ok(ContractStatus::Cancelled),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SignatureParty {
    Family,
    Director,
}

impl fmt::Display for SignatureParty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureParty::Family => write!(f, "Family"),
            SignatureParty::Director => write!(f, "Director"),
        }
    }
}

/// One goods or services line of a funeral contract (General Price List item).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractLineItem {
    pub description: HeaplessString<200>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub taxable: bool,
    /// Inventory item consumed by this line, if any
    pub inventory_sku: Option<HeaplessString<50>>,
}

impl ContractLineItem {
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }

    pub fn validate(&self) -> ApiResult<()> {
        if self.quantity <= 0 {
            return Err(ApiError::validation(format!(
                "line item '{}' must have a positive quantity",
                self.description
            )));
        }
        if self.unit_price.is_sign_negative() && !self.unit_price.is_zero() {
            return Err(ApiError::validation(format!(
                "line item '{}' has a negative unit price",
                self.description
            )));
        }
        Ok(())
    }
}

/// Statement of goods and services signed by the family and the director.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub case_key: BusinessKey,
    pub line_items: Vec<ContractLineItem>,
    /// Fraction applied to taxable lines, e.g. 0.0825
    pub tax_rate: Decimal,
    pub status: ContractStatus,
    pub family_signed_at: Option<DateTime<Utc>>,
    pub director_signed_at: Option<DateTime<Utc>>,
    pub signature_envelope_id: Option<HeaplessString<100>>,
    /// Identifier assigned by the ERP backend once the contract is booked
    pub erp_contract_id: Option<HeaplessString<64>>,
    /// Journal entry that booked the cost of the stock this contract consumed
    #[serde(default)]
    pub cogs_journal_entry_id: Option<HeaplessString<64>>,
}

pub type ContractModel = Versioned<Contract>;

impl TemporalEntity for Contract {
    const ENTITY: &'static str = "Contract";
}

impl Contract {
    pub fn draft(case_key: BusinessKey, tax_rate: Decimal, line_items: Vec<ContractLineItem>) -> ApiResult<Self> {
        for item in &line_items {
            item.validate()?;
        }
        Ok(Self {
            case_key,
            line_items,
            tax_rate,
            status: ContractStatus::Draft,
            family_signed_at: None,
            director_signed_at: None,
            signature_envelope_id: None,
            erp_contract_id: None,
            cogs_journal_entry_id: None,
        })
    }

    pub fn subtotal(&self) -> Decimal {
        self.line_items.iter().map(ContractLineItem::line_total).sum()
    }

    pub fn tax(&self) -> Decimal {
        let taxable: Decimal = self
            .line_items
            .iter()
            .filter(|item| item.taxable)
            .map(ContractLineItem::line_total)
            .sum();
        (taxable * self.tax_rate).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn total(&self) -> Decimal {
        self.subtotal() + self.tax()
    }

    /// Earliest signature time, used as the contract's billing date.
    pub fn signed_at(&self) -> Option<DateTime<Utc>> {
        match (self.family_signed_at, self.director_signed_at) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn add_line_item(&self, item: ContractLineItem) -> ApiResult<Self> {
        if self.status != ContractStatus::Draft {
            return Err(ApiError::rule(format!(
                "line items can only be changed on a draft contract (status {})",
                self.status
            )));
        }
        item.validate()?;
        let mut next = self.clone();
        next.line_items.push(item);
        Ok(next)
    }

    pub fn submit_for_signature(&self, envelope_id: HeaplessString<100>) -> ApiResult<Self> {
        if self.status != ContractStatus::Draft {
            return Err(ApiError::transition(Self::ENTITY, self.status, ContractStatus::PendingSignature));
        }
        if self.line_items.is_empty() {
            return Err(ApiError::rule("a contract needs at least one line item before signature"));
        }
        let mut next = self.clone();
        next.status = ContractStatus::PendingSignature;
        next.signature_envelope_id = Some(envelope_id);
        Ok(next)
    }

    /// Records one party's signature; the contract is fully signed once both have signed.
    pub fn record_signature(&self, party: SignatureParty, at: DateTime<Utc>) -> ApiResult<Self> {
        if self.status != ContractStatus::PendingSignature {
            return Err(ApiError::transition(Self::ENTITY, self.status, ContractStatus::FullySigned));
        }
        let mut next = self.clone();
        let slot = match party {
            SignatureParty::Family => &mut next.family_signed_at,
            SignatureParty::Director => &mut next.director_signed_at,
        };
        if slot.is_some() {
            return Err(ApiError::rule(format!("{party} has already signed")));
        }
        *slot = Some(at);
        if next.family_signed_at.is_some() && next.director_signed_at.is_some() {
            next.status = ContractStatus::FullySigned;
        }
        Ok(next)
    }

    pub fn cancel(&self) -> ApiResult<Self> {
        match self.status {
            ContractStatus::Draft | ContractStatus::PendingSignature => {
                let mut next = self.clone();
                next.status = ContractStatus::Cancelled;
                Ok(next)
            }
            other => Err(ApiError::transition(Self::ENTITY, other, ContractStatus::Cancelled)),
        }
    }

    /// Stock is issued once per contract.
    pub fn ensure_inventory_unconsumed(&self) -> ApiResult<()> {
        match &self.cogs_journal_entry_id {
            Some(entry) => Err(ApiError::rule(format!(
                "contract inventory was already consumed (journal entry {entry})"
            ))),
            None => Ok(()),
        }
    }

    pub fn record_inventory_consumption(&self, journal_entry_id: HeaplessString<64>) -> ApiResult<Self> {
        if self.status != ContractStatus::FullySigned {
            return Err(ApiError::rule(format!(
                "inventory is consumed only for fully signed contracts (status {})",
                self.status
            )));
        }
        self.ensure_inventory_unconsumed()?;
        let mut next = self.clone();
        next.cogs_journal_entry_id = Some(journal_entry_id);
        Ok(next)
    }

    pub fn with_erp_contract_id(&self, erp_contract_id: HeaplessString<64>) -> Self {
        let mut next = self.clone();
        next.erp_contract_id = Some(erp_contract_id);
        next
    }
}
