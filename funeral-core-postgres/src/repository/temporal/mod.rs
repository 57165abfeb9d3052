pub mod close_version;
pub mod create_versioned;
pub mod find_as_of;
pub mod find_current;
pub mod find_current_batch;
pub mod load_history;
pub mod repo_impl;
pub mod save_version;
pub mod temporal_table;

pub use repo_impl::TemporalRepositoryImpl;
pub use temporal_table::{PgQuery, TemporalTable, META_COLUMNS};
