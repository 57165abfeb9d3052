mod support;

pub mod case_service;
pub mod contact_service;
pub mod contract_service;
pub mod hr_service;
pub mod inventory_service;
pub mod memorial_service;
pub mod payment_service;
pub mod policy_service;
pub mod procurement_service;
pub mod reporting_service;
pub mod scheduling_service;

pub use case_service::*;
pub use contact_service::*;
pub use contract_service::*;
pub use hr_service::*;
pub use inventory_service::*;
pub use memorial_service::*;
pub use payment_service::*;
pub use policy_service::*;
pub use procurement_service::*;
pub use reporting_service::*;
pub use scheduling_service::*;
