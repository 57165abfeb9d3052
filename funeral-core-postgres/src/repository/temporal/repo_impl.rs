use funeral_core_db::models::temporal::Versioned;
use std::error::Error;
use std::marker::PhantomData;

use super::temporal_table::{select_sql, versioned_from_row, PgQuery, TemporalTable};
use crate::error::RepositoryError;
use crate::executor::Executor;

/// SCD2 repository over one temporal table.
///
/// Every statement runs on the shared unit-of-work transaction; nothing is
/// visible to other sessions until the executor commits.
pub struct TemporalRepositoryImpl<T> {
    pub executor: Executor,
    _entity: PhantomData<fn() -> T>,
}

impl<T: TemporalTable> TemporalRepositoryImpl<T> {
    pub fn new(executor: Executor) -> Self {
        Self {
            executor,
            _entity: PhantomData,
        }
    }

    /// Runs `SELECT <all columns> WHERE <condition>` with the binds applied by `bind`.
    pub(crate) async fn fetch_where<F>(
        &self,
        condition: &str,
        bind: F,
    ) -> Result<Vec<Versioned<T>>, Box<dyn Error + Send + Sync>>
    where
        F: for<'q> FnOnce(PgQuery<'q>) -> PgQuery<'q> + Send,
    {
        let sql = select_sql::<T>(condition);
        let rows = {
            let mut tx = self.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or(RepositoryError::TransactionConsumed)?;
            bind(sqlx::query(&sql)).fetch_all(&mut **transaction).await?
        };
        rows.iter().map(versioned_from_row::<T>).collect()
    }
}
