use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::models::appointment::AppointmentModel;
use crate::models::case::{CaseModel, CaseStatus};
use crate::models::contact::ContactModel;
use crate::models::contract::ContractModel;
use crate::models::memorial_template::{MemorialTemplateModel, TemplateCategory};
use crate::models::payment::PaymentModel;
use crate::models::temporal::BusinessKey;

// Entity finders only ever return current versions.

#[async_trait]
pub trait FindPaymentsByCase: Send + Sync {
    async fn find_payments_by_case(
        &self,
        case_key: &BusinessKey,
    ) -> Result<Vec<PaymentModel>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Payments whose `payment_date` lies in `[from, to)`, ordered by date.
#[async_trait]
pub trait FindPaymentsByDateRange: Send + Sync {
    async fn find_payments_by_date_range(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<PaymentModel>, Box<dyn std::error::Error + Send + Sync>>;
}

#[async_trait]
pub trait FindContractsByCase: Send + Sync {
    async fn find_contracts_by_case(
        &self,
        case_key: &BusinessKey,
    ) -> Result<Vec<ContractModel>, Box<dyn std::error::Error + Send + Sync>>;
}

#[async_trait]
pub trait FindCasesByStatus: Send + Sync {
    async fn find_cases_by_status(
        &self,
        statuses: &[CaseStatus],
    ) -> Result<Vec<CaseModel>, Box<dyn std::error::Error + Send + Sync>>;
}

#[async_trait]
pub trait FindContactsByCase: Send + Sync {
    async fn find_contacts_by_case(
        &self,
        case_key: &BusinessKey,
    ) -> Result<Vec<ContactModel>, Box<dyn std::error::Error + Send + Sync>>;
}

/// The most recently published Active template of a category.
#[async_trait]
pub trait FindActiveTemplateByCategory: Send + Sync {
    async fn find_active_template_by_category(
        &self,
        category: TemplateCategory,
    ) -> Result<Option<MemorialTemplateModel>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Appointments of one director starting in `[from, to)`, cancelled ones included.
#[async_trait]
pub trait FindAppointmentsByDirector: Send + Sync {
    async fn find_appointments_by_director(
        &self,
        director_id: Uuid,
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Result<Vec<AppointmentModel>, Box<dyn std::error::Error + Send + Sync>>;
}
