use thiserror::Error;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Transaction has been consumed")]
    TransactionConsumed,
    #[error("Concurrent update detected on {entity} '{business_key}'")]
    ConcurrentUpdate { entity: &'static str, business_key: String },
    #[error("{entity} '{business_key}' already exists")]
    AlreadyExists { entity: &'static str, business_key: String },
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
