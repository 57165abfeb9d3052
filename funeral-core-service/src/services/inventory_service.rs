use chrono::Utc;
use funeral_core_api::{ApiError, ApiResult};
use funeral_core_db::domain::{InventoryPosition, Issue};
use funeral_core_db::models::contract::{Contract, ContractStatus};
use funeral_core_db::models::temporal::parse_business_key;
use funeral_core_db::repository::ContractRepository;
use funeral_core_db::utils::to_heapless;
use futures_util::future::try_join_all;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::support::{require_current, save_one};
use crate::commands::{CogsAccounts, ReceiveInventoryCommand};
use crate::ports::{
    ErpBackend, InventoryTransaction, InventoryTransactionKind, JournalEntry, JournalLine,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractConsumption {
    pub issues: Vec<Issue>,
    pub total_cogs: Decimal,
    /// `None` when the contract holds no inventory items
    pub journal_entry_id: Option<String>,
}

/// Stock movements valued at weighted average cost.
pub struct InventoryService {
    erp: Arc<dyn ErpBackend>,
    contracts: Arc<dyn ContractRepository>,
}

impl InventoryService {
    pub fn new(erp: Arc<dyn ErpBackend>, contracts: Arc<dyn ContractRepository>) -> Self {
        Self { erp, contracts }
    }

    pub async fn receive_inventory(&self, cmd: ReceiveInventoryCommand) -> ApiResult<InventoryPosition> {
        cmd.validate()?;
        let position = self.erp.get_inventory_position(&cmd.sku).await?;
        let updated = position.receive(cmd.quantity, cmd.unit_cost)?;
        self.erp
            .record_inventory_transaction(&InventoryTransaction {
                sku: cmd.sku.clone(),
                kind: InventoryTransactionKind::Receipt,
                quantity: cmd.quantity,
                unit_cost: cmd.unit_cost,
                reference: cmd.reference,
                resulting_position: updated.clone(),
            })
            .await?;
        info!(sku = %cmd.sku, quantity = %cmd.quantity, average_cost = %updated.average_cost, "Inventory received");
        Ok(updated)
    }

    /// Issues the stock a signed contract sells and books the cost of goods sold.
    ///
    /// Every SKU is checked before anything is written, so one short item
    /// leaves all positions untouched. The posted journal entry is recorded on
    /// a new contract version and a second call is rejected.
    pub async fn consume_inventory_for_contract(
        &self,
        contract_key: &str,
        accounts: CogsAccounts,
        actor: Uuid,
    ) -> ApiResult<ContractConsumption> {
        accounts.validate()?;
        let key = parse_business_key(contract_key)?;
        let contract = require_current::<Contract, _>(&*self.contracts, &key).await?;
        if contract.data.status != ContractStatus::FullySigned {
            return Err(ApiError::rule(format!(
                "inventory is consumed only for fully signed contracts (status {})",
                contract.data.status
            )));
        }
        contract.data.ensure_inventory_unconsumed()?;

        let mut demand: BTreeMap<String, Decimal> = BTreeMap::new();
        for item in &contract.data.line_items {
            if let Some(sku) = &item.inventory_sku {
                *demand.entry(sku.to_string()).or_insert(Decimal::ZERO) += Decimal::from(item.quantity);
            }
        }
        if demand.is_empty() {
            return Ok(ContractConsumption {
                issues: Vec::new(),
                total_cogs: Decimal::ZERO,
                journal_entry_id: None,
            });
        }

        let positions = try_join_all(demand.keys().map(|sku| self.erp.get_inventory_position(sku))).await?;
        let issues = positions
            .iter()
            .zip(demand.values())
            .map(|(position, quantity)| position.issue(*quantity))
            .collect::<ApiResult<Vec<Issue>>>()?;

        for issue in &issues {
            self.erp
                .record_inventory_transaction(&InventoryTransaction {
                    sku: issue.position.sku.clone(),
                    kind: InventoryTransactionKind::Issue,
                    quantity: issue.quantity,
                    unit_cost: issue.cogs / issue.quantity,
                    reference: Some(key.to_string()),
                    resulting_position: issue.position.clone(),
                })
                .await?;
        }

        let total_cogs: Decimal = issues.iter().map(|i| i.cogs).sum();
        let entry = JournalEntry {
            entry_date: Utc::now().date_naive(),
            memo: format!("COGS for contract {key}"),
            lines: vec![
                JournalLine {
                    account: accounts.cogs_account,
                    debit: total_cogs,
                    credit: Decimal::ZERO,
                },
                JournalLine {
                    account: accounts.inventory_account,
                    debit: Decimal::ZERO,
                    credit: total_cogs,
                },
            ],
        };
        let posted = self.erp.post_journal_entry(&entry).await?;
        let consumed = contract
            .data
            .record_inventory_consumption(to_heapless(&posted.journal_entry_id, "journal_entry_id")?)?;
        save_one(&*self.contracts, &contract, consumed, actor).await?;
        info!(contract = %key, %total_cogs, journal_entry = %posted.journal_entry_id, "Contract inventory consumed");
        Ok(ContractConsumption {
            issues,
            total_cogs,
            journal_entry_id: Some(posted.journal_entry_id),
        })
    }
}
