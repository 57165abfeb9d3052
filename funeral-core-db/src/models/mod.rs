pub mod appointment;
pub mod case;
pub mod contact;
pub mod contract;
pub mod identifiable;
pub mod memorial_template;
pub mod payment;
pub mod policy;
pub mod temporal;

// Re-exports
pub use appointment::*;
pub use case::*;
pub use contact::*;
pub use contract::*;
pub use identifiable::*;
pub use memorial_template::*;
pub use payment::*;
pub use policy::*;
pub use temporal::*;
