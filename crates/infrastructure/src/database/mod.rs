use ionman_dns_domain::config::DatabaseConfig;
use sqlx::migrate::Migrator;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions, SqliteSynchronous,
};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// Create the SQLite pool and run pending migrations.
///
/// WAL journal mode lets the log flush task write while snapshot reloads
/// read. Each long-lived task clones the pool handle; connections are
/// never shared across tasks directly.
pub async fn create_pool(cfg: &DatabaseConfig) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(&cfg.path)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(Duration::from_secs(cfg.busy_timeout_secs));

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(cfg.busy_timeout_secs))
        .connect_with(options)
        .await?;

    sqlx::query("PRAGMA temp_store = MEMORY").execute(&pool).await?;

    let migrator = Migrator::new(Path::new("./migrations")).await?;
    migrator.run(&pool).await?;

    Ok(pool)
}

/// In-memory pool for tests: same pragmas, schema applied inline.
pub async fn create_memory_pool() -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")?.foreign_keys(true);
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await?;
    sqlx::raw_sql(include_str!("../../../../migrations/0001_init.sql"))
        .execute(&pool)
        .await?;
    Ok(pool)
}
