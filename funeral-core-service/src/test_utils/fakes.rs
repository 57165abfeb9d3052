use async_trait::async_trait;
use funeral_core_api::{ApiError, ApiResult};
use funeral_core_db::domain::{InventoryPosition, PurchaseOrder, Receipt, VendorBill};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Mutex;

use crate::ports::*;

/// ERP backend double that records every write.
#[derive(Default)]
pub struct FakeErp {
    pub purchase_orders: Mutex<HashMap<String, PurchaseOrder>>,
    pub receipts: Mutex<HashMap<String, Vec<Receipt>>>,
    pub bills: Mutex<HashMap<String, VendorBill>>,
    pub positions: Mutex<HashMap<String, InventoryPosition>>,
    pub contracts: Mutex<Vec<ErpContract>>,
    pub journal_entries: Mutex<Vec<JournalEntry>>,
    pub inventory_transactions: Mutex<Vec<InventoryTransaction>>,
    pub payment_runs: Mutex<Vec<ApPaymentRunRequest>>,
    pub payroll_runs: Mutex<Vec<PayrollRunRequest>>,
    /// Fail every call with a network error
    pub offline: std::sync::atomic::AtomicBool,
    in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl FakeErp {
    fn check_online(&self) -> ApiResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ApiError::NetworkError("ERP unreachable".into()));
        }
        Ok(())
    }

    pub async fn add_bill(&self, bill: VendorBill) {
        self.bills.lock().await.insert(bill.bill_id.clone(), bill);
    }

    pub async fn add_purchase_order(&self, po: PurchaseOrder, receipts: Vec<Receipt>) {
        self.receipts.lock().await.insert(po.po_number.clone(), receipts);
        self.purchase_orders.lock().await.insert(po.po_number.clone(), po);
    }

    pub async fn set_position(&self, position: InventoryPosition) {
        self.positions.lock().await.insert(position.sku.clone(), position);
    }
}

#[async_trait]
impl ErpBackend for FakeErp {
    async fn create_contract(&self, contract: &ErpContract) -> ApiResult<ErpContractRef> {
        self.check_online()?;
        let mut contracts = self.contracts.lock().await;
        contracts.push(contract.clone());
        Ok(ErpContractRef {
            erp_contract_id: format!("SO-{:04}", contracts.len()),
        })
    }

    async fn post_journal_entry(&self, entry: &JournalEntry) -> ApiResult<JournalEntryRef> {
        self.check_online()?;
        if !entry.is_balanced() {
            return Err(ApiError::rule("journal entry is not balanced"));
        }
        let mut entries = self.journal_entries.lock().await;
        entries.push(entry.clone());
        Ok(JournalEntryRef {
            journal_entry_id: format!("JE-{}", entries.len()),
        })
    }

    async fn get_purchase_order(&self, po_number: &str) -> ApiResult<PurchaseOrder> {
        self.check_online()?;
        self.purchase_orders
            .lock()
            .await
            .get(po_number)
            .cloned()
            .ok_or_else(|| ApiError::not_found("PurchaseOrder", po_number))
    }

    async fn get_receipts(&self, po_number: &str) -> ApiResult<Vec<Receipt>> {
        self.check_online()?;
        Ok(self.receipts.lock().await.get(po_number).cloned().unwrap_or_default())
    }

    async fn get_vendor_bill(&self, bill_id: &str) -> ApiResult<VendorBill> {
        self.check_online()?;
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let bill = self.bills.lock().await.get(bill_id).cloned();
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        bill.ok_or_else(|| ApiError::not_found("VendorBill", bill_id))
    }

    async fn list_payable_bills(&self) -> ApiResult<Vec<String>> {
        self.check_online()?;
        let mut ids: Vec<String> = self.bills.lock().await.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }

    async fn create_ap_payment_run(&self, run: &ApPaymentRunRequest) -> ApiResult<RunRef> {
        self.check_online()?;
        let mut runs = self.payment_runs.lock().await;
        runs.push(run.clone());
        Ok(RunRef {
            run_id: format!("APRUN-{}", runs.len()),
        })
    }

    async fn get_inventory_position(&self, sku: &str) -> ApiResult<InventoryPosition> {
        self.check_online()?;
        Ok(self
            .positions
            .lock()
            .await
            .get(sku)
            .cloned()
            .unwrap_or_else(|| InventoryPosition::empty(sku)))
    }

    async fn record_inventory_transaction(&self, transaction: &InventoryTransaction) -> ApiResult<()> {
        self.check_online()?;
        self.positions
            .lock()
            .await
            .insert(transaction.sku.clone(), transaction.resulting_position.clone());
        self.inventory_transactions.lock().await.push(transaction.clone());
        Ok(())
    }

    async fn submit_payroll_run(&self, run: &PayrollRunRequest) -> ApiResult<RunRef> {
        self.check_online()?;
        let mut runs = self.payroll_runs.lock().await;
        runs.push(run.clone());
        Ok(RunRef {
            run_id: format!("PAY-{}", runs.len()),
        })
    }
}

#[derive(Default)]
pub struct FakeEmail {
    pub sent: Mutex<Vec<EmailMessage>>,
}

#[async_trait]
impl EmailService for FakeEmail {
    async fn send(&self, message: &EmailMessage) -> ApiResult<()> {
        self.sent.lock().await.push(message.clone());
        Ok(())
    }
}

/// Returns the HTML bytes unchanged so tests can inspect the rendered document.
#[derive(Default)]
pub struct FakePdf {
    pub rendered: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl PdfRenderer for FakePdf {
    async fn render(&self, html: &str, file_name: &str) -> ApiResult<Vec<u8>> {
        self.rendered.lock().await.push((file_name.to_string(), html.to_string()));
        Ok(html.as_bytes().to_vec())
    }
}

#[derive(Default)]
pub struct FakeSignature {
    pub requests: Mutex<Vec<SignatureRequest>>,
}

#[async_trait]
impl SignatureService for FakeSignature {
    async fn create_envelope(&self, request: &SignatureRequest) -> ApiResult<SignatureEnvelope> {
        let mut requests = self.requests.lock().await;
        requests.push(request.clone());
        let envelope_id = format!("env-{}", requests.len());
        Ok(SignatureEnvelope {
            signing_url: format!("https://sign.example.test/{envelope_id}"),
            envelope_id,
        })
    }
}
