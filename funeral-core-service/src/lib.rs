pub mod commands;
pub mod config;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod test_utils;

pub use commands::*;
pub use config::*;
pub use services::*;
