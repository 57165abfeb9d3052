use chrono::Utc;
use funeral_core_api::{ApiError, ApiResult};
use funeral_core_db::models::case::Case;
use funeral_core_db::models::contact::Contact;
use funeral_core_db::models::contract::{Contract, ContractLineItem, ContractModel, ContractStatus};
use funeral_core_db::models::temporal::parse_business_key;
use funeral_core_db::repository::{CaseRepository, ContactRepository, ContractRepository};
use funeral_core_db::utils::{to_heapless, to_optional_heapless};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::support::{create_one, first_version, require_current, save_one};
use crate::commands::{CreateContractCommand, LineItemInput, RecordSignatureCommand};
use crate::ports::{
    EmailMessage, EmailService, ErpBackend, ErpContract, ErpContractLine, SignatureRequest, SignatureService,
};

fn line_item(input: &LineItemInput) -> ApiResult<ContractLineItem> {
    input.validate()?;
    let item = ContractLineItem {
        description: to_heapless(&input.description, "description")?,
        quantity: input.quantity,
        unit_price: input.unit_price,
        taxable: input.taxable,
        inventory_sku: to_optional_heapless(input.inventory_sku.as_deref(), "inventory_sku")?,
    };
    item.validate()?;
    Ok(item)
}

/// Contract drafting, e-signature and booking into the ERP.
pub struct ContractService {
    contracts: Arc<dyn ContractRepository>,
    cases: Arc<dyn CaseRepository>,
    contacts: Arc<dyn ContactRepository>,
    erp: Arc<dyn ErpBackend>,
    signatures: Arc<dyn SignatureService>,
    email: Arc<dyn EmailService>,
}

impl ContractService {
    pub fn new(
        contracts: Arc<dyn ContractRepository>,
        cases: Arc<dyn CaseRepository>,
        contacts: Arc<dyn ContactRepository>,
        erp: Arc<dyn ErpBackend>,
        signatures: Arc<dyn SignatureService>,
        email: Arc<dyn EmailService>,
    ) -> Self {
        Self {
            contracts,
            cases,
            contacts,
            erp,
            signatures,
            email,
        }
    }

    async fn require(&self, contract_key: &str) -> ApiResult<ContractModel> {
        let key = parse_business_key(contract_key)?;
        require_current::<Contract, _>(&*self.contracts, &key).await
    }

    pub async fn create_contract(&self, cmd: CreateContractCommand, actor: Uuid) -> ApiResult<ContractModel> {
        cmd.validate()?;
        let case_key = parse_business_key(&cmd.case_key)?;
        let case = require_current::<Case, _>(&*self.cases, &case_key).await?;
        case.data.ensure_editable()?;

        let items = cmd.line_items.iter().map(line_item).collect::<ApiResult<Vec<_>>>()?;
        let contract = Contract::draft(case_key, cmd.tax_rate, items)?;
        let saved = create_one(&*self.contracts, first_version(contract, actor, Utc::now())?).await?;
        info!(contract = %saved.meta.business_key, case = %saved.data.case_key, "Contract drafted");
        Ok(saved)
    }

    pub async fn add_line_item(&self, contract_key: &str, input: LineItemInput, actor: Uuid) -> ApiResult<ContractModel> {
        let current = self.require(contract_key).await?;
        let next = current.data.add_line_item(line_item(&input)?)?;
        save_one(&*self.contracts, &current, next, actor).await
    }

    /// Creates an e-signature envelope and emails the signing link to the case's primary contact.
    pub async fn submit_for_signature(&self, contract_key: &str, actor: Uuid) -> ApiResult<ContractModel> {
        let current = self.require(contract_key).await?;
        if current.data.status != ContractStatus::Draft {
            return Err(ApiError::transition("Contract", current.data.status, ContractStatus::PendingSignature));
        }
        let case = require_current::<Case, _>(&*self.cases, &current.data.case_key).await?;
        let contact_key = case
            .data
            .primary_contact_key
            .clone()
            .ok_or_else(|| ApiError::rule(format!("case {} has no primary contact", case.data.case_number)))?;
        let contact = require_current::<Contact, _>(&*self.contacts, &contact_key).await?;
        let signer_email = contact
            .data
            .email
            .as_ref()
            .map(|e| e.to_string())
            .ok_or_else(|| ApiError::rule(format!("{} has no email address", contact.data.full_name())))?;

        let envelope = self
            .signatures
            .create_envelope(&SignatureRequest {
                contract_key: current.meta.business_key.to_string(),
                document_title: format!("Statement of Funeral Goods and Services, {}", case.data.decedent_name),
                signer_name: contact.data.full_name(),
                signer_email: signer_email.clone(),
                contract_total: current.data.total(),
            })
            .await?;
        let next = current
            .data
            .submit_for_signature(to_heapless(&envelope.envelope_id, "envelope_id")?)?;
        let saved = save_one(&*self.contracts, &current, next, actor).await?;

        self.email
            .send(&EmailMessage {
                to: signer_email,
                subject: format!("Please sign the arrangements for {}", case.data.decedent_name),
                body: format!(
                    "Dear {},\n\nThe funeral contract is ready for your signature:\n{}\n",
                    contact.data.full_name(),
                    envelope.signing_url
                ),
            })
            .await?;
        info!(contract = %saved.meta.business_key, envelope = %envelope.envelope_id, "Contract sent for signature");
        Ok(saved)
    }

    /// Records a signature; once fully signed the contract is booked in the ERP.
    pub async fn record_signature(&self, cmd: RecordSignatureCommand, actor: Uuid) -> ApiResult<ContractModel> {
        let current = self.require(&cmd.contract_key).await?;
        let next = current
            .data
            .record_signature(cmd.party, cmd.signed_at.unwrap_or_else(Utc::now))?;
        let saved = save_one(&*self.contracts, &current, next, actor).await?;
        info!(contract = %saved.meta.business_key, party = %cmd.party, status = %saved.data.status, "Signature recorded");
        if saved.data.status != ContractStatus::FullySigned {
            return Ok(saved);
        }

        let booking = ErpContract {
            contract_key: saved.meta.business_key.to_string(),
            case_key: saved.data.case_key.to_string(),
            signed_at: saved.data.signed_at(),
            lines: saved
                .data
                .line_items
                .iter()
                .map(|item| ErpContractLine {
                    description: item.description.to_string(),
                    quantity: item.quantity,
                    unit_price: item.unit_price,
                    taxable: item.taxable,
                })
                .collect(),
            tax: saved.data.tax(),
            total: saved.data.total(),
        };
        let erp_ref = self.erp.create_contract(&booking).await?;
        let next = saved
            .data
            .with_erp_contract_id(to_heapless(&erp_ref.erp_contract_id, "erp_contract_id")?);
        let booked = save_one(&*self.contracts, &saved, next, actor).await?;
        info!(contract = %booked.meta.business_key, erp_contract_id = %erp_ref.erp_contract_id, "Contract booked in ERP");
        Ok(booked)
    }

    pub async fn cancel_contract(&self, contract_key: &str, actor: Uuid) -> ApiResult<ContractModel> {
        let current = self.require(contract_key).await?;
        let next = current.data.cancel()?;
        let saved = save_one(&*self.contracts, &current, next, actor).await?;
        info!(contract = %saved.meta.business_key, "Contract cancelled");
        Ok(saved)
    }
}
