use funeral_core_api::{ApiError, ApiResult};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Unit costs are carried with four decimal places.
const COST_SCALE: u32 = 4;

/// On-hand quantity and weighted average cost (WAC) of one SKU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryPosition {
    pub sku: String,
    pub quantity_on_hand: Decimal,
    pub average_cost: Decimal,
}

/// Outcome of issuing stock: the new position and the cost of goods sold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub position: InventoryPosition,
    pub quantity: Decimal,
    pub cogs: Decimal,
}

impl InventoryPosition {
    pub fn empty(sku: impl Into<String>) -> Self {
        Self {
            sku: sku.into(),
            quantity_on_hand: Decimal::ZERO,
            average_cost: Decimal::ZERO,
        }
    }

    pub fn inventory_value(&self) -> Decimal {
        (self.quantity_on_hand * self.average_cost).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    }

    /// Receives `quantity` units at `unit_cost`, re-weighting the average cost.
    pub fn receive(&self, quantity: Decimal, unit_cost: Decimal) -> ApiResult<Self> {
        if quantity <= Decimal::ZERO {
            return Err(ApiError::validation(format!("received quantity for {} must be positive", self.sku)));
        }
        if unit_cost < Decimal::ZERO {
            return Err(ApiError::validation(format!("unit cost for {} must not be negative", self.sku)));
        }
        if self.quantity_on_hand < Decimal::ZERO {
            return Err(ApiError::rule(format!(
                "{} has a negative on-hand quantity of {}; reconcile stock before receiving",
                self.sku, self.quantity_on_hand
            )));
        }
        let new_quantity = self.quantity_on_hand + quantity;
        let average_cost = ((self.quantity_on_hand * self.average_cost + quantity * unit_cost) / new_quantity)
            .round_dp_with_strategy(COST_SCALE, RoundingStrategy::MidpointAwayFromZero);
        Ok(Self {
            sku: self.sku.clone(),
            quantity_on_hand: new_quantity,
            average_cost,
        })
    }

    /// Issues `quantity` units at the current average cost.
    pub fn issue(&self, quantity: Decimal) -> ApiResult<Issue> {
        if quantity <= Decimal::ZERO {
            return Err(ApiError::validation(format!("issued quantity for {} must be positive", self.sku)));
        }
        if quantity > self.quantity_on_hand {
            return Err(ApiError::rule(format!(
                "cannot issue {quantity} of {}: only {} on hand",
                self.sku, self.quantity_on_hand
            )));
        }
        let cogs = (quantity * self.average_cost).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        let remaining = self.quantity_on_hand - quantity;
        Ok(Issue {
            position: Self {
                sku: self.sku.clone(),
                quantity_on_hand: remaining,
                // average cost is unchanged by issues; reset once stock runs out
                average_cost: if remaining.is_zero() { Decimal::ZERO } else { self.average_cost },
            },
            quantity,
            cogs,
        })
    }
}
