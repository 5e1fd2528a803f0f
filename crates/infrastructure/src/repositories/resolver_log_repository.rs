use async_trait::async_trait;
use ionman_dns_application::ports::ResolverLogRepository;
use ionman_dns_domain::{DomainError, ResolverEvent};
use sqlx::SqlitePool;

/// qnames are capped at the DNS name limit before insert.
const MAX_QNAME_LEN: usize = 253;

/// Bulk writer for the `resolver_log` table.
pub struct SqliteResolverLogRepository {
    pool: SqlitePool,
}

impl SqliteResolverLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResolverLogRepository for SqliteResolverLogRepository {
    async fn log_batch(&self, events: &[ResolverEvent]) -> Result<(), DomainError> {
        if events.is_empty() {
            return Ok(());
        }

        let mut sql = String::from(
            "INSERT INTO resolver_log (qname, qtype, client_ip, status, cached, upstream_ms, logged_at) VALUES ",
        );
        for i in 0..events.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str("(?, ?, ?, ?, ?, ?, ?)");
        }

        let mut query = sqlx::query(&sql);
        for event in events {
            let qname = &event.qname[..event.qname.len().min(MAX_QNAME_LEN)];
            query = query
                .bind(qname.to_string())
                .bind(&event.qtype)
                .bind(event.client_ip.to_string())
                .bind(event.status.as_str())
                .bind(event.cached)
                .bind(event.upstream_ms)
                .bind(event.logged_at.format("%Y-%m-%d %H:%M:%S").to_string());
        }

        query
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_memory_pool;
    use ionman_dns_domain::QueryAction;
    use sqlx::Row;
    use std::sync::Arc;

    #[tokio::test]
    async fn persists_resolver_events() {
        let pool = create_memory_pool().await.unwrap();
        let repo = SqliteResolverLogRepository::new(pool.clone());

        let events = vec![
            ResolverEvent::new(
                Arc::from("foo.example"),
                "A".into(),
                "127.0.0.1".parse().unwrap(),
                QueryAction::Cached,
                true,
                0.0,
            ),
            ResolverEvent::new(
                Arc::from("bar.example"),
                "AAAA".into(),
                "127.0.0.1".parse().unwrap(),
                QueryAction::Allowed,
                false,
                12.5,
            ),
        ];
        repo.log_batch(&events).await.unwrap();

        let rows = sqlx::query("SELECT qname, status, cached FROM resolver_log ORDER BY id")
            .fetch_all(&pool)
            .await
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].get::<String, _>("status"), "cached");
        assert!(rows[0].get::<bool, _>("cached"));
        assert_eq!(rows[1].get::<String, _>("qname"), "bar.example");
    }

    #[tokio::test]
    async fn truncates_oversized_qnames() {
        let pool = create_memory_pool().await.unwrap();
        let repo = SqliteResolverLogRepository::new(pool.clone());

        let long = "a".repeat(400);
        let events = vec![ResolverEvent::new(
            Arc::from(long.as_str()),
            "A".into(),
            "127.0.0.1".parse().unwrap(),
            QueryAction::Allowed,
            false,
            1.0,
        )];
        repo.log_batch(&events).await.unwrap();

        let row = sqlx::query("SELECT qname FROM resolver_log")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(row.get::<String, _>("qname").len(), 253);
    }
}
