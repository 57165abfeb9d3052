//! Schema setup and teardown from the crate's `migrations/` and `cleanup/` scripts.
//!
//! Teardown runs the cleanup scripts newest first so dependent tables go
//! before the enum types they use.

use sqlx::PgPool;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptOrder {
    Oldest,
    Newest,
}

/// Creates the schema. Returns the number of scripts executed.
///
/// ```rust,no_run
/// use sqlx::PgPool;
/// use funeral_core_postgres::repository::db_init::init_database;
///
/// # async fn example(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// init_database(pool).await?;
/// # Ok(())
/// # }
/// ```
pub async fn init_database(pool: &PgPool) -> Result<usize, sqlx::Error> {
    run_scripts(pool, &script_dir("migrations"), ScriptOrder::Oldest).await
}

/// Drops everything `init_database` created.
pub async fn cleanup_database(pool: &PgPool) -> Result<usize, sqlx::Error> {
    run_scripts(pool, &script_dir("cleanup"), ScriptOrder::Newest).await
}

fn script_dir(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(name)
}

fn schema_scripts(dir: &Path, order: ScriptOrder) -> std::io::Result<Vec<PathBuf>> {
    let mut scripts: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("sql"))
        .collect();
    scripts.sort();
    if order == ScriptOrder::Newest {
        scripts.reverse();
    }
    Ok(scripts)
}

async fn run_scripts(pool: &PgPool, dir: &Path, order: ScriptOrder) -> Result<usize, sqlx::Error> {
    let scripts = schema_scripts(dir, order).map_err(sqlx::Error::Io)?;
    for path in &scripts {
        let sql = fs::read_to_string(path).map_err(sqlx::Error::Io)?;
        sqlx::raw_sql(&sql).execute(pool).await?;
        info!(file = %path.display(), "Executed schema script");
    }
    Ok(scripts.len())
}
