use funeral_core_api::{ApiError, ApiResult};
use funeral_core_db::domain::{three_way_match, ThreeWayMatchResult, VendorBill};
use futures_util::{stream, StreamExt, TryStreamExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use validator::Validate;

use crate::commands::ApPaymentRunCommand;
use crate::ports::{ApPaymentRunRequest, ErpBackend, VendorPayment};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HoldReason {
    /// The bill references no purchase order
    NoPurchaseOrder,
    MatchFailed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeldBill {
    pub bill_id: String,
    pub vendor_id: String,
    pub amount: Decimal,
    pub reason: HoldReason,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApPaymentRunResult {
    /// `None` when nothing was payable
    pub run_id: Option<String>,
    pub payments: Vec<VendorPayment>,
    pub total_paid: Decimal,
    pub held_for_approval: Vec<HeldBill>,
}

/// Vendor bill reconciliation and AP payment runs against the ERP.
pub struct ProcurementService {
    erp: Arc<dyn ErpBackend>,
    fetch_concurrency: usize,
}

impl ProcurementService {
    pub fn new(erp: Arc<dyn ErpBackend>, fetch_concurrency: usize) -> Self {
        Self {
            erp,
            fetch_concurrency: fetch_concurrency.max(1),
        }
    }

    /// Fetches the PO, its receipts and the bill concurrently and reconciles them.
    pub async fn three_way_match(&self, po_number: &str, bill_id: &str) -> ApiResult<ThreeWayMatchResult> {
        let (po, receipts, bill) = tokio::try_join!(
            self.erp.get_purchase_order(po_number),
            self.erp.get_receipts(po_number),
            self.erp.get_vendor_bill(bill_id),
        )?;
        let result = three_way_match(&po, &receipts, &bill);
        debug!(po_number, bill_id, is_valid = result.is_valid, "Three-way match computed");
        Ok(result)
    }

    async fn match_bill(&self, bill: &VendorBill) -> ApiResult<Option<HoldReason>> {
        let Some(po_number) = bill.po_number.as_deref() else {
            return Ok(Some(HoldReason::NoPurchaseOrder));
        };
        let (po, receipts) = tokio::try_join!(self.erp.get_purchase_order(po_number), self.erp.get_receipts(po_number))?;
        let result = three_way_match(&po, &receipts, bill);
        Ok((!result.is_valid).then_some(HoldReason::MatchFailed))
    }

    /// Pays every bill due on or before `pay_through` whose three-way match is clean.
    ///
    /// Bills that fail the match are reported as held for approval and left unpaid.
    pub async fn ap_payment_run(&self, cmd: ApPaymentRunCommand) -> ApiResult<ApPaymentRunResult> {
        cmd.validate()?;
        let bill_ids = self.erp.list_payable_bills().await?;
        let bills: Vec<VendorBill> = stream::iter(bill_ids)
            .map(|bill_id| async move { self.erp.get_vendor_bill(&bill_id).await })
            .buffer_unordered(self.fetch_concurrency)
            .try_collect()
            .await?;
        let due: Vec<VendorBill> = bills.into_iter().filter(|b| b.due_date <= cmd.pay_through).collect();

        let outcomes: Vec<(VendorBill, Option<HoldReason>)> = stream::iter(due)
            .map(|bill| async move {
                let hold = self.match_bill(&bill).await?;
                Ok::<_, ApiError>((bill, hold))
            })
            .buffer_unordered(self.fetch_concurrency)
            .try_collect()
            .await?;

        let mut by_vendor: BTreeMap<String, VendorPayment> = BTreeMap::new();
        let mut held = Vec::new();
        for (bill, hold) in outcomes {
            let amount = bill.total();
            match hold {
                Some(reason) => {
                    warn!(bill = %bill.bill_id, vendor = %bill.vendor_id, ?reason, "Bill held for approval");
                    held.push(HeldBill {
                        bill_id: bill.bill_id,
                        vendor_id: bill.vendor_id,
                        amount,
                        reason,
                    });
                }
                None => {
                    let payment = by_vendor.entry(bill.vendor_id.clone()).or_insert_with(|| VendorPayment {
                        vendor_id: bill.vendor_id.clone(),
                        bill_ids: Vec::new(),
                        amount: Decimal::ZERO,
                    });
                    payment.bill_ids.push(bill.bill_id);
                    payment.amount += amount;
                }
            }
        }
        held.sort_by(|a, b| a.bill_id.cmp(&b.bill_id));
        let mut payments: Vec<VendorPayment> = by_vendor.into_values().collect();
        for payment in &mut payments {
            payment.bill_ids.sort();
        }
        let total_paid: Decimal = payments.iter().map(|p| p.amount).sum();

        let run_id = if payments.is_empty() {
            None
        } else {
            let run = self
                .erp
                .create_ap_payment_run(&ApPaymentRunRequest {
                    pay_date: cmd.pay_through,
                    cash_account: cmd.cash_account.clone(),
                    payments: payments.clone(),
                })
                .await?;
            Some(run.run_id)
        };
        info!(
            run = ?run_id,
            vendors = payments.len(),
            held = held.len(),
            %total_paid,
            "AP payment run completed"
        );
        Ok(ApPaymentRunResult {
            run_id,
            payments,
            total_paid,
            held_for_approval: held,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::FakeErp;
    use chrono::NaiveDate;
    use funeral_core_db::domain::{PurchaseOrder, PurchaseOrderLine, Receipt, ReceiptLine, VendorBillLine};
    use std::sync::atomic::Ordering;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    fn po(number: &str, vendor: &str, unit_price: i64) -> PurchaseOrder {
        PurchaseOrder {
            po_number: number.into(),
            vendor_id: vendor.into(),
            lines: vec![PurchaseOrderLine {
                line_id: "L1".into(),
                sku: "URN-BRASS".into(),
                description: "Brass urn".into(),
                quantity: Decimal::from(10),
                unit_price: Decimal::from(unit_price),
            }],
        }
    }

    fn receipt(po_number: &str, quantity: i64) -> Receipt {
        Receipt {
            receipt_id: format!("R-{po_number}"),
            po_number: po_number.into(),
            lines: vec![ReceiptLine {
                po_line_id: "L1".into(),
                quantity_received: Decimal::from(quantity),
            }],
        }
    }

    fn bill(id: &str, vendor: &str, po_number: Option<&str>, due: u32, quantity: i64, unit_price: i64) -> VendorBill {
        VendorBill {
            bill_id: id.into(),
            vendor_id: vendor.into(),
            po_number: po_number.map(str::to_string),
            due_date: date(due),
            lines: vec![VendorBillLine {
                po_line_id: Some("L1".into()),
                description: "Brass urn".into(),
                quantity: Decimal::from(quantity),
                unit_price: Decimal::from(unit_price),
            }],
        }
    }

    async fn erp() -> Arc<FakeErp> {
        let erp = Arc::new(FakeErp::default());
        erp.add_purchase_order(po("PO-1", "V-1", 100), vec![receipt("PO-1", 10)]).await;
        erp.add_purchase_order(po("PO-2", "V-1", 100), vec![receipt("PO-2", 5)]).await;
        erp.add_purchase_order(po("PO-3", "V-2", 50), vec![receipt("PO-3", 10)]).await;
        erp.add_purchase_order(po("PO-4", "V-2", 50), vec![receipt("PO-4", 10)]).await;
        // clean
        erp.add_bill(bill("B-1", "V-1", Some("PO-1"), 10, 10, 100)).await;
        erp.add_bill(bill("B-3", "V-2", Some("PO-3"), 12, 10, 52)).await;
        // billed above received
        erp.add_bill(bill("B-2", "V-1", Some("PO-2"), 10, 10, 100)).await;
        // no PO
        erp.add_bill(bill("B-5", "V-2", None, 11, 1, 75)).await;
        // clean but not yet due
        erp.add_bill(bill("B-4", "V-2", Some("PO-4"), 30, 10, 50)).await;
        erp
    }

    #[tokio::test]
    async fn test_three_way_match_flags_over_billing() {
        let erp = erp().await;
        let procurement = ProcurementService::new(erp.clone(), 4);
        assert!(procurement.three_way_match("PO-1", "B-1").await.unwrap().is_valid);
        let result = procurement.three_way_match("PO-2", "B-2").await.unwrap();
        assert!(!result.is_valid);
        assert!(result.requires_manual_approval);
        assert!(procurement.three_way_match("PO-9", "B-1").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_ap_payment_run() {
        let erp = erp().await;
        let procurement = ProcurementService::new(erp.clone(), 2);
        let result = procurement
            .ap_payment_run(ApPaymentRunCommand {
                pay_through: date(20),
                cash_account: "1010-operating".into(),
            })
            .await
            .unwrap();

        assert_eq!(result.run_id.as_deref(), Some("APRUN-1"));
        assert_eq!(result.payments.len(), 2);
        assert_eq!(result.payments[0].vendor_id, "V-1");
        assert_eq!(result.payments[0].bill_ids, vec!["B-1".to_string()]);
        assert_eq!(result.payments[1].amount, Decimal::from(520));
        assert_eq!(result.total_paid, Decimal::from(1520));

        let held: Vec<(&str, &HoldReason)> = result
            .held_for_approval
            .iter()
            .map(|h| (h.bill_id.as_str(), &h.reason))
            .collect();
        assert_eq!(held, vec![("B-2", &HoldReason::MatchFailed), ("B-5", &HoldReason::NoPurchaseOrder)]);

        let runs = erp.payment_runs.lock().await;
        assert_eq!(runs[0].cash_account, "1010-operating");
        assert!(erp.max_in_flight.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_nothing_payable() {
        let erp = Arc::new(FakeErp::default());
        let procurement = ProcurementService::new(erp.clone(), 4);
        let result = procurement
            .ap_payment_run(ApPaymentRunCommand {
                pay_through: date(20),
                cash_account: "1010".into(),
            })
            .await
            .unwrap();
        assert!(result.run_id.is_none());
        assert!(erp.payment_runs.lock().await.is_empty());
    }
}
