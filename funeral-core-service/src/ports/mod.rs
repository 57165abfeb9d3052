pub mod email;
pub mod erp;
pub mod pdf;
pub mod signature;

pub use email::*;
pub use erp::*;
pub use pdf::*;
pub use signature::*;
