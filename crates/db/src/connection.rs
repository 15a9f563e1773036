use std::time::Duration;

use sqlx::sqlite::SqlitePoolOptions;

use crate::migrations;

pub type DbPool = sqlx::SqlitePool;

pub async fn connect_with_settings(
    database_url: &str,
    max_connections: u32,
    timeout_secs: u64,
) -> Result<DbPool, sqlx::Error> {
    SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .acquire_timeout(Duration::from_secs(timeout_secs.max(1)))
        .after_connect(|conn, _meta| {
            Box::pin(async move {
                sqlx::query("PRAGMA foreign_keys = ON").execute(&mut *conn).await?;
                sqlx::query("PRAGMA journal_mode = WAL").execute(&mut *conn).await?;
                sqlx::query("PRAGMA busy_timeout = 5000").execute(&mut *conn).await?;
                Ok(())
            })
        })
        .connect(database_url)
        .await
}

/// Single-connection in-memory database with the schema applied.
///
/// An in-memory sqlite database lives only as long as its connection, so the pool is capped at one.
pub async fn connect_in_memory() -> Result<DbPool, sqlx::Error> {
    let pool = connect_with_settings("sqlite::memory:", 1, 30).await?;
    migrations::run_pending(&pool).await?;
    Ok(pool)
}
