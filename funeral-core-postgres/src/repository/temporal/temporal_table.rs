use funeral_core_db::models::temporal::{TemporalEntity, TemporalMeta, Versioned};
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::Postgres;
use std::error::Error;

use crate::utils::TryFromRow;

pub type PgQuery<'q> = Query<'q, Postgres, PgArguments>;

/// Version columns shared by every temporal table, in bind order.
pub const META_COLUMNS: [&str; 11] = [
    "id",
    "business_key",
    "version",
    "valid_from",
    "valid_to",
    "is_current",
    "hash",
    "created_by",
    "updated_by",
    "created_at",
    "updated_at",
];

/// Maps an entity's business fields onto the columns of its SCD2 table.
pub trait TemporalTable: TemporalEntity + Sized {
    const TABLE: &'static str;
    /// Business columns, in the order `bind_data` binds them
    const DATA_COLUMNS: &'static [&'static str];

    fn bind_data<'q>(&self, query: PgQuery<'q>) -> PgQuery<'q>;

    fn data_from_row(row: &PgRow) -> Result<Self, Box<dyn Error + Send + Sync>>;
}

pub(crate) fn column_list<T: TemporalTable>() -> String {
    META_COLUMNS
        .iter()
        .chain(T::DATA_COLUMNS.iter())
        .copied()
        .collect::<Vec<_>>()
        .join(", ")
}

pub(crate) fn select_sql<T: TemporalTable>(condition: &str) -> String {
    format!("SELECT {} FROM {} WHERE {condition}", column_list::<T>(), T::TABLE)
}

pub(crate) fn insert_sql<T: TemporalTable>() -> String {
    let count = META_COLUMNS.len() + T::DATA_COLUMNS.len();
    let placeholders = (1..=count).map(|i| format!("${i}")).collect::<Vec<_>>().join(", ");
    format!("INSERT INTO {} ({}) VALUES ({placeholders})", T::TABLE, column_list::<T>())
}

pub(crate) fn bind_meta<'q>(meta: &TemporalMeta, query: PgQuery<'q>) -> PgQuery<'q> {
    query
        .bind(meta.id)
        .bind(meta.business_key.to_string())
        .bind(meta.version)
        .bind(meta.valid_from)
        .bind(meta.valid_to)
        .bind(meta.is_current)
        .bind(meta.hash)
        .bind(meta.created_by)
        .bind(meta.updated_by)
        .bind(meta.created_at)
        .bind(meta.updated_at)
}

pub(crate) fn versioned_from_row<T: TemporalTable>(row: &PgRow) -> Result<Versioned<T>, Box<dyn Error + Send + Sync>> {
    Ok(Versioned {
        meta: TemporalMeta::try_from_row(row)?,
        data: T::data_from_row(row)?,
    })
}
