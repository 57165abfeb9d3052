pub mod backend;
pub mod client;
pub mod error;

pub use client::ErpHttpClient;
pub use error::ErpError;
