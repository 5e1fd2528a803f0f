use async_trait::async_trait;
use ionman_dns_application::ports::QueryLogRepository;
use ionman_dns_domain::{DomainError, QueryEvent};
use sqlx::SqlitePool;

/// Bulk writer for the `query_log` table.
pub struct SqliteQueryLogRepository {
    pool: SqlitePool,
}

impl SqliteQueryLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl QueryLogRepository for SqliteQueryLogRepository {
    async fn log_batch(&self, events: &[QueryEvent]) -> Result<(), DomainError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut sql = String::from(
            "INSERT INTO query_log (client_ip, domain, query_type, action, logged_at) VALUES ",
        );
        for i in 0..events.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str("(?, ?, ?, ?, ?)");
        }

        let mut query = sqlx::query(&sql);
        for event in events {
            query = query
                .bind(event.client_ip.to_string())
                .bind(event.domain.as_ref())
                .bind(&event.query_type)
                .bind(event.action.as_str())
                .bind(event.logged_at.format("%Y-%m-%d %H:%M:%S").to_string());
        }

        query
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}
