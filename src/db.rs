use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// The table meme records live in.
pub const MEMES_TABLE: &str = "meme_api";

/// Opens a connection pool, creating the database file if it does not exist.
///
/// In-memory databases are private to each connection, so `sqlite::memory:`
/// must be used with `max_connections = 1`.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid database URL '{}'", database_url))?
        .create_if_missing(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .context("Failed to connect to the database")?;

    tracing::info!(max_connections, "Database pool ready");
    Ok(pool)
}

/// Applies the embedded schema migrations.
pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    tracing::info!(table = MEMES_TABLE, "Database migrations applied");
    Ok(())
}

#[cfg(test)]
pub(crate) async fn test_pool() -> SqlitePool {
    let pool = connect("sqlite::memory:", 1).await.unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn migrations_create_the_table_and_are_repeatable() {
        let pool = test_pool().await;
        run_migrations(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {MEMES_TABLE}"))
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }
}
