use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::RepositoryError;

/// One database transaction shared by every repository of a unit of work.
///
/// Repositories lock `tx` for the duration of a statement batch. The
/// transaction is rolled back when the last clone is dropped without a
/// `commit`.
#[derive(Clone)]
pub struct Executor {
    pub tx: Arc<Mutex<Option<Transaction<'static, Postgres>>>>,
}

impl Executor {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    pub async fn begin(pool: &PgPool) -> Result<Self, sqlx::Error> {
        Ok(Self::new(pool.begin().await?))
    }

    pub async fn commit(&self) -> Result<(), RepositoryError> {
        let tx = self.tx.lock().await.take().ok_or(RepositoryError::TransactionConsumed)?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn rollback(&self) -> Result<(), RepositoryError> {
        let tx = self.tx.lock().await.take().ok_or(RepositoryError::TransactionConsumed)?;
        tx.rollback().await?;
        Ok(())
    }
}
