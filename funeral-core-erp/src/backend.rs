use async_trait::async_trait;
use funeral_core_api::ApiResult;
use funeral_core_db::domain::{InventoryPosition, PurchaseOrder, Receipt, VendorBill};
use funeral_core_service::ports::{
    ApPaymentRunRequest, ErpBackend, ErpContract, ErpContractRef, InventoryTransaction, JournalEntry,
    JournalEntryRef, PayrollRunRequest, RunRef,
};
use serde::Deserialize;
use tracing::{info, warn};

use crate::client::ErpHttpClient;

#[derive(Debug, Deserialize)]
struct PayableBills {
    bill_ids: Vec<String>,
}

#[async_trait]
impl ErpBackend for ErpHttpClient {
    async fn create_contract(&self, contract: &ErpContract) -> ApiResult<ErpContractRef> {
        let created: ErpContractRef = self
            .post("/api/contracts", contract)
            .await
            .map_err(|e| e.into_api_error("Contract", &contract.contract_key))?;
        info!(
            contract_key = %contract.contract_key,
            erp_contract_id = %created.erp_contract_id,
            "Contract booked in ERP"
        );
        Ok(created)
    }

    async fn post_journal_entry(&self, entry: &JournalEntry) -> ApiResult<JournalEntryRef> {
        let posted: JournalEntryRef = self
            .post("/api/journal-entries", entry)
            .await
            .map_err(|e| e.into_api_error("JournalEntry", &entry.memo))?;
        info!(journal_entry_id = %posted.journal_entry_id, memo = %entry.memo, "Journal entry posted");
        Ok(posted)
    }

    async fn get_purchase_order(&self, po_number: &str) -> ApiResult<PurchaseOrder> {
        let entity = "PurchaseOrder";
        let id = self.segment(po_number).map_err(|e| e.into_api_error(entity, po_number))?;
        self.get(&format!("/api/purchase-orders/{id}"))
            .await
            .map_err(|e| e.into_api_error(entity, po_number))
    }

    async fn get_receipts(&self, po_number: &str) -> ApiResult<Vec<Receipt>> {
        let entity = "PurchaseOrder";
        let id = self.segment(po_number).map_err(|e| e.into_api_error(entity, po_number))?;
        self.get(&format!("/api/purchase-orders/{id}/receipts"))
            .await
            .map_err(|e| e.into_api_error(entity, po_number))
    }

    async fn get_vendor_bill(&self, bill_id: &str) -> ApiResult<VendorBill> {
        let entity = "VendorBill";
        let id = self.segment(bill_id).map_err(|e| e.into_api_error(entity, bill_id))?;
        self.get(&format!("/api/vendor-bills/{id}"))
            .await
            .map_err(|e| e.into_api_error(entity, bill_id))
    }

    async fn list_payable_bills(&self) -> ApiResult<Vec<String>> {
        let bills: PayableBills = self
            .get("/api/vendor-bills?status=open")
            .await
            .map_err(|e| e.into_api_error("VendorBill", "open"))?;
        Ok(bills.bill_ids)
    }

    async fn create_ap_payment_run(&self, run: &ApPaymentRunRequest) -> ApiResult<RunRef> {
        let created: RunRef = self
            .post("/api/ap-payment-runs", run)
            .await
            .map_err(|e| e.into_api_error("ApPaymentRun", run.pay_date))?;
        info!(run_id = %created.run_id, payments = run.payments.len(), "AP payment run created");
        Ok(created)
    }

    /// A SKU the ERP has never stocked has an empty position.
    async fn get_inventory_position(&self, sku: &str) -> ApiResult<InventoryPosition> {
        let entity = "InventoryPosition";
        let id = self.segment(sku).map_err(|e| e.into_api_error(entity, sku))?;
        match self.get::<InventoryPosition>(&format!("/api/inventory/{id}")).await {
            Ok(position) => Ok(position),
            Err(e) if e.is_not_found() => {
                warn!(sku, "No inventory position in ERP, starting empty");
                Ok(InventoryPosition::empty(sku))
            }
            Err(e) => Err(e.into_api_error(entity, sku)),
        }
    }

    async fn record_inventory_transaction(&self, transaction: &InventoryTransaction) -> ApiResult<()> {
        self.post_empty("/api/inventory/transactions", transaction)
            .await
            .map_err(|e| e.into_api_error("InventoryTransaction", &transaction.sku))
    }

    async fn submit_payroll_run(&self, run: &PayrollRunRequest) -> ApiResult<RunRef> {
        let created: RunRef = self
            .post("/api/payroll-runs", run)
            .await
            .map_err(|e| e.into_api_error("PayrollRun", run.period_start))?;
        info!(run_id = %created.run_id, total_gross = %run.total_gross, "Payroll run submitted");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use funeral_core_api::ApiError;
    use funeral_core_service::config::ErpConfig;
    use funeral_core_service::ports::{InventoryTransactionKind, JournalLine};
    use httpmock::prelude::*;
    use rust_decimal::Decimal;
    use serde_json::json;

    use crate::client::API_KEY_HEADER;

    fn client(server: &MockServer) -> ErpHttpClient {
        ErpHttpClient::new(&ErpConfig {
            base_url: server.base_url(),
            api_key: Some("test-key".to_string()),
            timeout_secs: 5,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_purchase_order() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/purchase-orders/PO-100")
                .header(API_KEY_HEADER, "test-key");
            then.status(200).json_body(json!({
                "po_number": "PO-100",
                "vendor_id": "V-1",
                "lines": [{
                    "line_id": "L1",
                    "sku": "CASKET-OAK",
                    "description": "Oak casket",
                    "quantity": "2",
                    "unit_price": "1500.00"
                }]
            }));
        });

        let po = client(&server).get_purchase_order("PO-100").await.unwrap();
        mock.assert();
        assert_eq!(po.vendor_id, "V-1");
        assert_eq!(po.lines[0].unit_price, Decimal::new(150000, 2));
    }

    #[tokio::test]
    async fn test_missing_vendor_bill_is_not_found() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/vendor-bills/B-404");
            then.status(404).body("no such bill");
        });

        let err = client(&server).get_vendor_bill("B-404").await.unwrap_err();
        mock.assert();
        assert!(matches!(err, ApiError::NotFound { entity: "VendorBill", ref key } if key == "B-404"));
    }

    #[tokio::test]
    async fn test_server_error_is_network_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/vendor-bills");
            then.status(503).body("maintenance");
        });

        let err = client(&server).list_payable_bills().await.unwrap_err();
        assert!(matches!(err, ApiError::NetworkError(ref m) if m.contains("maintenance")));
    }

    #[tokio::test]
    async fn test_list_payable_bills() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/vendor-bills").query_param("status", "open");
            then.status(200).json_body(json!({ "bill_ids": ["B-1", "B-2"] }));
        });

        let ids = client(&server).list_payable_bills().await.unwrap();
        mock.assert();
        assert_eq!(ids, vec!["B-1".to_string(), "B-2".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_sku_has_empty_position() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/inventory/URN-BRASS");
            then.status(404);
        });

        let position = client(&server).get_inventory_position("URN-BRASS").await.unwrap();
        assert_eq!(position, InventoryPosition::empty("URN-BRASS"));
    }

    #[tokio::test]
    async fn test_rejected_journal_entry_is_rule_violation() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/journal-entries")
                .body_contains("\"memo\":\"COGS FH-1\"");
            then.status(422).body("period closed");
        });

        let entry = JournalEntry {
            entry_date: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            memo: "COGS FH-1".into(),
            lines: vec![
                JournalLine {
                    account: "5000".into(),
                    debit: Decimal::from(100),
                    credit: Decimal::ZERO,
                },
                JournalLine {
                    account: "1400".into(),
                    debit: Decimal::ZERO,
                    credit: Decimal::from(100),
                },
            ],
        };
        let err = client(&server).post_journal_entry(&entry).await.unwrap_err();
        mock.assert();
        assert!(matches!(err, ApiError::BusinessRuleViolation(ref m) if m.contains("period closed")));
    }

    #[tokio::test]
    async fn test_record_inventory_transaction() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/api/inventory/transactions")
                .body_contains("\"kind\":\"Issue\"");
            then.status(204);
        });

        let transaction = InventoryTransaction {
            sku: "CASKET-OAK".into(),
            kind: InventoryTransactionKind::Issue,
            quantity: Decimal::ONE,
            unit_cost: Decimal::from(1500),
            reference: Some("contract-1".into()),
            resulting_position: InventoryPosition::empty("CASKET-OAK"),
        };
        client(&server).record_inventory_transaction(&transaction).await.unwrap();
        mock.assert();
    }

    #[tokio::test]
    async fn test_invalid_document_id_never_reaches_erp() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.any_request();
            then.status(200);
        });

        let err = client(&server).get_receipts("../secrets").await.unwrap_err();
        assert!(matches!(err, ApiError::ValidationError(_)));
        mock.assert_hits(0);
    }
}
