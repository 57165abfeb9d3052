use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use funeral_core_api::ApiResult;
use funeral_core_db::domain::{InventoryPosition, PayrollLine, PurchaseOrder, Receipt, VendorBill};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErpContractLine {
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub taxable: bool,
}

/// A fully signed contract booked as a sales document in the ERP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErpContract {
    pub contract_key: String,
    pub case_key: String,
    pub signed_at: Option<DateTime<Utc>>,
    pub lines: Vec<ErpContractLine>,
    pub tax: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErpContractRef {
    pub erp_contract_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalLine {
    pub account: String,
    pub debit: Decimal,
    pub credit: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub entry_date: NaiveDate,
    pub memo: String,
    pub lines: Vec<JournalLine>,
}

impl JournalEntry {
    pub fn is_balanced(&self) -> bool {
        let debits: Decimal = self.lines.iter().map(|l| l.debit).sum();
        let credits: Decimal = self.lines.iter().map(|l| l.credit).sum();
        debits == credits
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalEntryRef {
    pub journal_entry_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryTransactionKind {
    Receipt,
    Issue,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryTransaction {
    pub sku: String,
    pub kind: InventoryTransactionKind,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    /// Contract or purchase document the movement belongs to
    pub reference: Option<String>,
    /// Position after the movement, as computed locally
    pub resulting_position: InventoryPosition,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VendorPayment {
    pub vendor_id: String,
    pub bill_ids: Vec<String>,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApPaymentRunRequest {
    pub pay_date: NaiveDate,
    pub cash_account: String,
    pub payments: Vec<VendorPayment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayrollRunRequest {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub lines: Vec<PayrollLine>,
    pub total_gross: Decimal,
}

/// Identifier the ERP assigns to a submitted run (AP payments, payroll).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRef {
    pub run_id: String,
}

/// The external ERP backend: contracts, ledger, procurement, inventory and HR.
///
/// Adapters map transport failures to `ApiError::NetworkError` and missing
/// documents to `ApiError::NotFound`.
#[async_trait]
pub trait ErpBackend: Send + Sync {
    async fn create_contract(&self, contract: &ErpContract) -> ApiResult<ErpContractRef>;

    async fn post_journal_entry(&self, entry: &JournalEntry) -> ApiResult<JournalEntryRef>;

    async fn get_purchase_order(&self, po_number: &str) -> ApiResult<PurchaseOrder>;

    async fn get_receipts(&self, po_number: &str) -> ApiResult<Vec<Receipt>>;

    async fn get_vendor_bill(&self, bill_id: &str) -> ApiResult<VendorBill>;

    /// Ids of open vendor bills awaiting payment
    async fn list_payable_bills(&self) -> ApiResult<Vec<String>>;

    async fn create_ap_payment_run(&self, run: &ApPaymentRunRequest) -> ApiResult<RunRef>;

    async fn get_inventory_position(&self, sku: &str) -> ApiResult<InventoryPosition>;

    async fn record_inventory_transaction(&self, transaction: &InventoryTransaction) -> ApiResult<()>;

    async fn submit_payroll_run(&self, run: &PayrollRunRequest) -> ApiResult<RunRef>;
}
