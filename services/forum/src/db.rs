//! Pool setup for the forum schema

use common::database::{DatabaseConfig, init_pool, run_migrations};
use common::error::DatabaseResult;
use sqlx::migrate::Migrator;
use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::{ForumError, ForumResult};

/// Embedded forum schema migrations
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Open a pool and bring the forum schema up to date
pub async fn connect(config: &DatabaseConfig) -> DatabaseResult<SqlitePool> {
    let pool = init_pool(config).await?;
    run_migrations(&pool, &MIGRATOR).await?;
    Ok(pool)
}

/// Open a transaction that holds the database write lock from its first
/// statement. Concurrent writers wait on the busy timeout rather than
/// failing with `SQLITE_BUSY` when they upgrade from reading.
pub async fn begin_write(pool: &SqlitePool) -> ForumResult<Transaction<'static, Sqlite>> {
    pool.begin_with("BEGIN IMMEDIATE")
        .await
        .map_err(ForumError::Persistence)
}
