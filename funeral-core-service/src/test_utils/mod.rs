pub mod fakes;
pub mod memory_store;

pub use fakes::*;
pub use memory_store::*;
