use ionman_dns_domain::Config;
use ionman_dns_infrastructure::database::create_pool;
use sqlx::SqlitePool;
use tracing::info;

pub async fn init_database(config: &Config) -> anyhow::Result<SqlitePool> {
    let pool = create_pool(&config.database).await?;
    info!(path = %config.database.path, "Database ready");
    Ok(pool)
}
