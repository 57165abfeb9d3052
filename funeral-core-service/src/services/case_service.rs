use chrono::{DateTime, Utc};
use funeral_core_api::{ApiError, ApiResult};
use funeral_core_db::domain::case_financials;
use funeral_core_db::models::case::{Case, CaseModel, CaseStatus};
use funeral_core_db::models::contract::ContractStatus;
use funeral_core_db::models::temporal::parse_business_key;
use funeral_core_db::repository::{
    CaseRepository, ContractRepository, FindAsOf, FindContractsByCase, FindPaymentsByCase, LoadHistory, Page,
    PageRequest, PaymentRepository,
};
use funeral_core_db::utils::{to_heapless, to_optional_heapless};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::support::{create_one, first_version, require_current, save_one};
use crate::commands::{CreateCaseCommand, UpdateCaseDetailsCommand};

pub struct CaseService {
    cases: Arc<dyn CaseRepository>,
    contracts: Arc<dyn ContractRepository>,
    payments: Arc<dyn PaymentRepository>,
}

impl CaseService {
    pub fn new(
        cases: Arc<dyn CaseRepository>,
        contracts: Arc<dyn ContractRepository>,
        payments: Arc<dyn PaymentRepository>,
    ) -> Self {
        Self {
            cases,
            contracts,
            payments,
        }
    }

    pub async fn create_case(&self, cmd: CreateCaseCommand, actor: Uuid) -> ApiResult<CaseModel> {
        cmd.validate()?;
        let case = Case {
            case_number: to_heapless(&cmd.case_number, "case_number")?,
            decedent_name: to_heapless(&cmd.decedent_name, "decedent_name")?,
            date_of_birth: cmd.date_of_birth,
            date_of_death: cmd.date_of_death,
            service_type: cmd.service_type,
            service_date: cmd.service_date,
            funeral_director_id: cmd.funeral_director_id,
            funeral_director_name: to_optional_heapless(cmd.funeral_director_name.as_deref(), "funeral_director_name")?,
            primary_contact_key: cmd.primary_contact_key.as_deref().map(parse_business_key).transpose()?,
            status: CaseStatus::Inquiry,
            finalized_at: None,
        };
        case.validate_dates()?;
        let saved = create_one(&*self.cases, first_version(case, actor, Utc::now())?).await?;
        info!(case = %saved.meta.business_key, case_number = %saved.data.case_number, "Case opened");
        Ok(saved)
    }

    pub async fn update_case_details(
        &self,
        case_key: &str,
        cmd: UpdateCaseDetailsCommand,
        actor: Uuid,
    ) -> ApiResult<CaseModel> {
        cmd.validate()?;
        let current = self.require(case_key).await?;
        current.data.ensure_editable()?;

        let mut next = current.data.clone();
        if let Some(name) = cmd.decedent_name.as_deref() {
            next.decedent_name = to_heapless(name, "decedent_name")?;
        }
        if cmd.date_of_birth.is_some() {
            next.date_of_birth = cmd.date_of_birth;
        }
        if cmd.date_of_death.is_some() {
            next.date_of_death = cmd.date_of_death;
        }
        if let Some(service_type) = cmd.service_type {
            next.service_type = service_type;
        }
        if cmd.service_date.is_some() {
            next.service_date = cmd.service_date;
        }
        if cmd.funeral_director_id.is_some() {
            next.funeral_director_id = cmd.funeral_director_id;
        }
        if cmd.funeral_director_name.is_some() {
            next.funeral_director_name =
                to_optional_heapless(cmd.funeral_director_name.as_deref(), "funeral_director_name")?;
        }
        if let Some(contact) = cmd.primary_contact_key.as_deref() {
            next.primary_contact_key = Some(parse_business_key(contact)?);
        }
        next.validate_dates()?;
        save_one(&*self.cases, &current, next, actor).await
    }

    async fn require(&self, case_key: &str) -> ApiResult<CaseModel> {
        let key = parse_business_key(case_key)?;
        require_current::<Case, _>(&*self.cases, &key).await
    }

    async fn transition<F>(&self, case_key: &str, actor: Uuid, step: F) -> ApiResult<CaseModel>
    where
        F: FnOnce(&Case) -> ApiResult<Case>,
    {
        let current = self.require(case_key).await?;
        let next = step(&current.data)?;
        let saved = save_one(&*self.cases, &current, next, actor).await?;
        info!(case = %saved.meta.business_key, from = %current.data.status, to = %saved.data.status, "Case status changed");
        Ok(saved)
    }

    pub async fn activate_case(&self, case_key: &str, actor: Uuid) -> ApiResult<CaseModel> {
        self.transition(case_key, actor, Case::activate).await
    }

    /// Completes an Active case once a contract is fully signed and fully paid.
    pub async fn finalize_case(&self, case_key: &str, actor: Uuid) -> ApiResult<CaseModel> {
        let current = self.require(case_key).await?;
        if current.data.status != CaseStatus::Active {
            return Err(ApiError::transition("Case", current.data.status, CaseStatus::Completed));
        }
        let key = current.meta.business_key.clone();
        let contracts: Vec<_> = self
            .contracts
            .find_contracts_by_case(&key)
            .await
            .map_err(ApiError::persistence)?
            .into_iter()
            .map(|c| c.data)
            .collect();
        if !contracts.iter().any(|c| c.status == ContractStatus::FullySigned) {
            return Err(ApiError::rule(format!(
                "case {} has no fully signed contract",
                current.data.case_number
            )));
        }
        let payments: Vec<_> = self
            .payments
            .find_payments_by_case(&key)
            .await
            .map_err(ApiError::persistence)?
            .into_iter()
            .map(|p| p.data)
            .collect();
        let financials = case_financials(&contracts, &payments);
        if financials.balance_due > Decimal::ZERO {
            return Err(ApiError::rule(format!(
                "case {} has an outstanding balance of {}",
                current.data.case_number, financials.balance_due
            )));
        }

        let next = current.data.finalize(Utc::now())?;
        let saved = save_one(&*self.cases, &current, next, actor).await?;
        info!(case = %key, "Case finalized");
        Ok(saved)
    }

    pub async fn archive_case(&self, case_key: &str, actor: Uuid) -> ApiResult<CaseModel> {
        self.transition(case_key, actor, Case::archive).await
    }

    pub async fn case_history(&self, case_key: &str, page: PageRequest) -> ApiResult<Page<CaseModel>> {
        let key = parse_business_key(case_key)?;
        let history = self.cases.load_history(&key, page).await.map_err(ApiError::persistence)?;
        if history.total == 0 {
            return Err(ApiError::not_found("Case", key));
        }
        Ok(history)
    }

    /// The case as it was recorded at `instant`.
    pub async fn case_as_of(&self, case_key: &str, instant: DateTime<Utc>) -> ApiResult<CaseModel> {
        let key = parse_business_key(case_key)?;
        self.cases
            .find_as_of(&key, instant)
            .await
            .map_err(ApiError::persistence)?
            .ok_or_else(|| ApiError::not_found("Case", key))
    }
}
