use crate::models::appointment::AppointmentModel;
use crate::models::case::Case;
use crate::models::contact::Contact;
use crate::models::contract::Contract;
use crate::models::memorial_template::MemorialTemplate;
use crate::models::payment::Payment;
use crate::models::policy::{PaymentPolicy, SchedulingPolicy};
use crate::models::temporal::TemporalEntity;
use crate::repository::{
    CloseVersion, CreateBatch, CreateVersioned, FindActiveTemplateByCategory, FindAppointmentsByDirector, FindAsOf,
    FindCasesByStatus, FindContactsByCase, FindContractsByCase, FindCurrent, FindCurrentBatch,
    FindPaymentsByCase, FindPaymentsByDateRange, LoadBatch, LoadHistory, SaveVersion,
};

/// Every SCD2 operation over one entity type.
pub trait TemporalRepository<T: TemporalEntity>:
    FindCurrent<T>
    + FindCurrentBatch<T>
    + CreateVersioned<T>
    + SaveVersion<T>
    + CloseVersion<T>
    + LoadHistory<T>
    + FindAsOf<T>
{
}

impl<T, R> TemporalRepository<T> for R
where
    T: TemporalEntity,
    R: FindCurrent<T>
        + FindCurrentBatch<T>
        + CreateVersioned<T>
        + SaveVersion<T>
        + CloseVersion<T>
        + LoadHistory<T>
        + FindAsOf<T>,
{
}

pub trait CaseRepository: TemporalRepository<Case> + FindCasesByStatus {}
impl<R: TemporalRepository<Case> + FindCasesByStatus> CaseRepository for R {}

pub trait ContractRepository: TemporalRepository<Contract> + FindContractsByCase {}
impl<R: TemporalRepository<Contract> + FindContractsByCase> ContractRepository for R {}

pub trait PaymentRepository: TemporalRepository<Payment> + FindPaymentsByCase + FindPaymentsByDateRange {}
impl<R> PaymentRepository for R where
    R: TemporalRepository<Payment> + FindPaymentsByCase + FindPaymentsByDateRange
{
}

pub trait ContactRepository: TemporalRepository<Contact> + FindContactsByCase {}
impl<R: TemporalRepository<Contact> + FindContactsByCase> ContactRepository for R {}

pub trait MemorialTemplateRepository: TemporalRepository<MemorialTemplate> + FindActiveTemplateByCategory {}
impl<R> MemorialTemplateRepository for R where
    R: TemporalRepository<MemorialTemplate> + FindActiveTemplateByCategory
{
}

pub trait PaymentPolicyRepository: TemporalRepository<PaymentPolicy> {}
impl<R: TemporalRepository<PaymentPolicy>> PaymentPolicyRepository for R {}

pub trait SchedulingPolicyRepository: TemporalRepository<SchedulingPolicy> {}
impl<R: TemporalRepository<SchedulingPolicy>> SchedulingPolicyRepository for R {}

pub trait AppointmentRepository:
    CreateBatch<AppointmentModel> + LoadBatch<AppointmentModel> + FindAppointmentsByDirector
{
}
impl<R> AppointmentRepository for R where
    R: CreateBatch<AppointmentModel> + LoadBatch<AppointmentModel> + FindAppointmentsByDirector
{
}
