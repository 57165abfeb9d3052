use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use funeral_core_api::{validate_business_key, validate_positive_amount, validate_rate};
use funeral_core_db::models::appointment::AppointmentKind;
use funeral_core_db::models::case::ServiceType;
use funeral_core_db::models::contact::ContactRelationship;
use funeral_core_db::models::contract::SignatureParty;
use funeral_core_db::models::memorial_template::TemplateCategory;
use funeral_core_db::models::payment::PaymentMethod;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordPaymentCommand {
    #[validate(custom(function = "validate_business_key"))]
    pub case_key: String,
    #[validate(custom(function = "validate_positive_amount"))]
    pub amount: Decimal,
    pub method: PaymentMethod,
    /// Defaults to now
    pub payment_date: Option<DateTime<Utc>>,
    #[validate(length(max = 100))]
    pub reference: Option<String>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ProcessRefundCommand {
    #[validate(custom(function = "validate_business_key"))]
    pub payment_key: String,
    /// Full remaining amount when omitted
    pub refund_amount: Option<Decimal>,
    #[validate(length(min = 1, max = 500))]
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCaseCommand {
    #[validate(length(min = 1, max = 20))]
    pub case_number: String,
    #[validate(length(min = 1, max = 100))]
    pub decedent_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    pub service_type: ServiceType,
    pub service_date: Option<NaiveDate>,
    pub funeral_director_id: Option<Uuid>,
    #[validate(length(max = 100))]
    pub funeral_director_name: Option<String>,
    #[validate(custom(function = "validate_business_key"))]
    pub primary_contact_key: Option<String>,
}

/// Fields left as `None` keep their current value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCaseDetailsCommand {
    #[validate(length(min = 1, max = 100))]
    pub decedent_name: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub date_of_death: Option<NaiveDate>,
    pub service_type: Option<ServiceType>,
    pub service_date: Option<NaiveDate>,
    pub funeral_director_id: Option<Uuid>,
    #[validate(length(max = 100))]
    pub funeral_director_name: Option<String>,
    #[validate(custom(function = "validate_business_key"))]
    pub primary_contact_key: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LineItemInput {
    #[validate(length(min = 1, max = 200))]
    pub description: String,
    #[validate(range(min = 1))]
    pub quantity: i32,
    pub unit_price: Decimal,
    pub taxable: bool,
    #[validate(length(min = 1, max = 50))]
    pub inventory_sku: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateContractCommand {
    #[validate(custom(function = "validate_business_key"))]
    pub case_key: String,
    #[validate(custom(function = "validate_rate"))]
    pub tax_rate: Decimal,
    #[validate(nested)]
    pub line_items: Vec<LineItemInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordSignatureCommand {
    pub contract_key: String,
    pub party: SignatureParty,
    pub signed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ContactInput {
    #[validate(length(min = 1, max = 50))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50))]
    pub last_name: String,
    #[validate(email, length(max = 100))]
    pub email: Option<String>,
    #[validate(length(min = 3, max = 30))]
    pub phone: Option<String>,
    pub relationship: ContactRelationship,
    #[validate(custom(function = "validate_business_key"))]
    pub case_key: Option<String>,
    #[validate(length(max = 200))]
    pub address: Option<String>,
    #[validate(length(max = 500))]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTemplateCommand {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    pub category: TemplateCategory,
    #[validate(length(min = 1))]
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ScheduleAppointmentCommand {
    pub director_id: Uuid,
    #[validate(custom(function = "validate_business_key"))]
    pub case_key: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub kind: AppointmentKind,
    #[validate(length(min = 1, max = 100))]
    pub title: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReceiveInventoryCommand {
    #[validate(length(min = 1, max = 50))]
    pub sku: String,
    pub quantity: Decimal,
    pub unit_cost: Decimal,
    #[validate(length(max = 100))]
    pub reference: Option<String>,
}

/// GL accounts used when booking cost of goods sold.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CogsAccounts {
    #[validate(length(min = 1, max = 32))]
    pub cogs_account: String,
    #[validate(length(min = 1, max = 32))]
    pub inventory_account: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ApPaymentRunCommand {
    pub pay_through: NaiveDate,
    #[validate(length(min = 1, max = 32))]
    pub cash_account: String,
}
