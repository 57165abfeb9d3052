use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Billed unit price may deviate from the PO price by at most this percentage.
pub const PRICE_TOLERANCE_PERCENT: Decimal = Decimal::from_parts(5, 0, 0, false, 0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrderLine {
    pub line_id: String,
    pub sku: String,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub po_number: String,
    pub vendor_id: String,
    pub lines: Vec<PurchaseOrderLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub po_line_id: String,
    pub quantity_received: Decimal,
}

/// Goods receipt recorded against a purchase order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    pub receipt_id: String,
    pub po_number: String,
    pub lines: Vec<ReceiptLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorBillLine {
    /// `None` when the vendor billed something that was never ordered
    pub po_line_id: Option<String>,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorBill {
    pub bill_id: String,
    pub vendor_id: String,
    pub po_number: Option<String>,
    pub due_date: chrono::NaiveDate,
    pub lines: Vec<VendorBillLine>,
}

impl VendorBill {
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(|l| l.quantity * l.unit_price).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatchIssue {
    PriceVarianceExceeded { variance_percent: Decimal },
    OverBilled { received: Decimal, billed: Decimal },
    NotOnPurchaseOrder { description: String },
    VendorMismatch { po_vendor: String, bill_vendor: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineMatch {
    pub po_line_id: String,
    pub ordered_quantity: Decimal,
    pub received_quantity: Decimal,
    pub billed_quantity: Decimal,
    pub po_unit_price: Decimal,
    /// Quantity-weighted average billed price; equals the PO price when nothing was billed
    pub billed_unit_price: Decimal,
    /// (billed - PO) / PO * 100, rounded to two places
    pub price_variance_percent: Decimal,
    /// received - billed; negative means over-billing
    pub quantity_variance: Decimal,
    pub issues: Vec<MatchIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreeWayMatchResult {
    pub po_number: String,
    pub bill_id: String,
    pub is_valid: bool,
    pub requires_manual_approval: bool,
    pub lines: Vec<LineMatch>,
    /// Issues not attached to a single PO line
    pub bill_issues: Vec<MatchIssue>,
    pub bill_total: Decimal,
}

/// Unrounded; the tolerance check must see the exact deviation.
fn price_variance_percent(po_price: Decimal, billed_price: Decimal) -> Decimal {
    if po_price.is_zero() {
        return if billed_price.is_zero() {
            Decimal::ZERO
        } else {
            Decimal::ONE_HUNDRED
        };
    }
    (billed_price - po_price) / po_price * Decimal::ONE_HUNDRED
}

/// Reconciles a purchase order, its receipts and a vendor bill.
///
/// Any price variance beyond ±5%, any line billed above the received
/// quantity, or any bill line without a matching PO line invalidates the
/// match and routes the bill to manual approval.
pub fn three_way_match(po: &PurchaseOrder, receipts: &[Receipt], bill: &VendorBill) -> ThreeWayMatchResult {
    let mut bill_issues = Vec::new();
    if po.vendor_id != bill.vendor_id {
        bill_issues.push(MatchIssue::VendorMismatch {
            po_vendor: po.vendor_id.clone(),
            bill_vendor: bill.vendor_id.clone(),
        });
    }
    for line in &bill.lines {
        let known = line
            .po_line_id
            .as_ref()
            .is_some_and(|id| po.lines.iter().any(|p| &p.line_id == id));
        if !known {
            bill_issues.push(MatchIssue::NotOnPurchaseOrder {
                description: line.description.clone(),
            });
        }
    }

    let lines: Vec<LineMatch> = po
        .lines
        .iter()
        .map(|po_line| {
            let received_quantity: Decimal = receipts
                .iter()
                .flat_map(|r| r.lines.iter())
                .filter(|r| r.po_line_id == po_line.line_id)
                .map(|r| r.quantity_received)
                .sum();
            let billed: Vec<&VendorBillLine> = bill
                .lines
                .iter()
                .filter(|b| b.po_line_id.as_deref() == Some(po_line.line_id.as_str()))
                .collect();
            let billed_quantity: Decimal = billed.iter().map(|b| b.quantity).sum();
            let billed_amount: Decimal = billed.iter().map(|b| b.quantity * b.unit_price).sum();
            let billed_unit_price = if billed_quantity.is_zero() {
                po_line.unit_price
            } else {
                billed_amount / billed_quantity
            };

            let variance = price_variance_percent(po_line.unit_price, billed_unit_price);
            let rounded_variance = variance.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
            let quantity_variance = received_quantity - billed_quantity;

            let mut issues = Vec::new();
            if variance.abs() > PRICE_TOLERANCE_PERCENT {
                issues.push(MatchIssue::PriceVarianceExceeded {
                    variance_percent: rounded_variance,
                });
            }
            if billed_quantity > received_quantity {
                issues.push(MatchIssue::OverBilled {
                    received: received_quantity,
                    billed: billed_quantity,
                });
            }

            LineMatch {
                po_line_id: po_line.line_id.clone(),
                ordered_quantity: po_line.quantity,
                received_quantity,
                billed_quantity,
                po_unit_price: po_line.unit_price,
                billed_unit_price,
                price_variance_percent: rounded_variance,
                quantity_variance,
                issues,
            }
        })
        .collect();

    let is_valid = bill_issues.is_empty() && lines.iter().all(|l| l.issues.is_empty());
    ThreeWayMatchResult {
        po_number: po.po_number.clone(),
        bill_id: bill.bill_id.clone(),
        is_valid,
        requires_manual_approval: !is_valid,
        lines,
        bill_issues,
        bill_total: bill.total(),
    }
}
