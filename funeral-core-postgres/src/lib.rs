pub mod error;
pub mod executor;
pub mod postgres_repositories;
pub mod repository;
pub mod utils;

pub use error::RepositoryError;
pub use executor::Executor;
pub use postgres_repositories::{FuneralRepositories, PostgresRepositories};

#[cfg(test)]
pub mod test_helper;
