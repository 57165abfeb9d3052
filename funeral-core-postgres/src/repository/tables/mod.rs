pub mod case;
pub mod contact;
pub mod contract;
pub mod memorial_template;
pub mod payment;
pub mod policy;
