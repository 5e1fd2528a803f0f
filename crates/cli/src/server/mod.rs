use ionman_dns_application::RuleStoreAdapter;
use ionman_dns_domain::Config;
use ionman_dns_infrastructure::catalog::FileCatalogStore;
use ionman_dns_infrastructure::dns::proxy::FrontProxy;
use ionman_dns_infrastructure::dns::resolver::{RecursiveResolver, StatusWriter};
use ionman_dns_infrastructure::dns::rule_engine::RuleEngine;
use ionman_dns_infrastructure::firewall::{IptablesBackend, PortRuleSync};
use ionman_dns_infrastructure::logging::{event_queue, EventLogger, LoggerConfig};
use ionman_dns_infrastructure::repositories::{
    SqliteQueryLogRepository, SqliteResolverLogRepository, SqliteRuleStoreRepository,
};
use ionman_dns_jobs::{JobRunner, PortSyncJob, ReloadJob};
use sqlx::SqlitePool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Grace period for pending packet handlers and log drains after the
/// shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(3);

/// Wire everything together and serve until SIGINT/SIGTERM.
pub async fn run(config: Config, pool: SqlitePool) -> anyhow::Result<()> {
    let shutdown = CancellationToken::new();

    // Event queues and their batch consumers.
    let logger_config = LoggerConfig {
        max_batch_size: config.database.log_max_batch_size,
        retry_backoff: Duration::from_millis(config.database.log_retry_backoff_ms),
        ..Default::default()
    };
    let (query_tx, query_rx) = event_queue(config.database.log_queue_capacity);
    let query_logger = EventLogger::new(
        Arc::new(SqliteQueryLogRepository::new(pool.clone())),
        logger_config.clone(),
    )
    .start(query_rx, shutdown.clone());

    let (resolver_tx, resolver_rx) = event_queue(config.database.log_queue_capacity);
    let resolver_logger = EventLogger::new(
        Arc::new(SqliteResolverLogRepository::new(pool.clone())),
        logger_config,
    )
    .start(resolver_rx, shutdown.clone());

    // Rule state: store, catalogs, adapter, engine.
    let store = Arc::new(SqliteRuleStoreRepository::new(pool.clone()));
    let catalogs = Arc::new(FileCatalogStore::new(
        &config.rules.categories_path,
        &config.rules.games_path,
    ));
    let adapter = Arc::new(RuleStoreAdapter::new(store.clone(), catalogs.clone()));
    let engine = Arc::new(RuleEngine::new());

    // Listeners. A failed bind aborts startup.
    let proxy = Arc::new(FrontProxy::bind(&config.proxy, engine.clone(), query_tx.clone()).await?);
    let resolver = Arc::new(RecursiveResolver::bind(&config.resolver, resolver_tx.clone()).await?);
    let status_writer =
        StatusWriter::new(&config.resolver.status_path).start(resolver.clone(), shutdown.clone());

    // Firewall reconciliation.
    let backend = Arc::new(IptablesBackend::new(config.firewall.chain.clone()));
    let port_sync = Arc::new(PortRuleSync::new(
        adapter.clone(),
        backend,
        store.clone(),
        catalogs.clone(),
    ));

    // Background jobs: reload supervisor + port sync.
    let reload_trigger = Arc::new(Notify::new());
    let port_sync_trigger = Arc::new(Notify::new());
    JobRunner::new()
        .with_reload(
            ReloadJob::new(
                adapter.clone(),
                engine.clone(),
                reload_trigger.clone(),
                port_sync_trigger.clone(),
            )
            .with_interval(config.rules.reload_interval_secs)
            .with_hook(resolver.clone())
            .with_cancellation(shutdown.clone()),
        )
        .with_port_sync(
            PortSyncJob::new(port_sync, port_sync_trigger.clone())
                .with_interval(config.firewall.sync_interval_secs)
                .with_autodetect_cycles(config.firewall.autodetect_cycles)
                .with_cancellation(shutdown.clone()),
        )
        .start()
        .await;

    let proxy_task = tokio::spawn(proxy.clone().run(shutdown.clone()));
    let resolver_task = tokio::spawn(resolver.clone().run(shutdown.clone()));

    info!("IonMan DNS running");
    wait_for_signals(&reload_trigger).await?;

    info!("Shutdown signal received");
    shutdown.cancel();

    // Give pending handlers and the log drains a bounded window.
    let _ = tokio::time::timeout(SHUTDOWN_GRACE, async {
        let _ = proxy_task.await;
        let _ = resolver_task.await;
        let _ = status_writer.await;
        let _ = query_logger.await;
        let _ = resolver_logger.await;
    })
    .await;

    info!(
        dropped_query_events = query_tx.dropped(),
        dropped_resolver_events = resolver_tx.dropped(),
        "IonMan DNS stopped"
    );
    Ok(())
}

/// Block until SIGINT/SIGTERM. SIGHUP forces an immediate rule reload.
#[cfg(unix)]
async fn wait_for_signals(reload_trigger: &Notify) -> anyhow::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sighup = signal(SignalKind::hangup())?;

    loop {
        tokio::select! {
            _ = sigint.recv() => return Ok(()),
            _ = sigterm.recv() => return Ok(()),
            _ = sighup.recv() => {
                info!("SIGHUP received; reloading rules");
                reload_trigger.notify_one();
            }
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signals(_reload_trigger: &Notify) -> anyhow::Result<()> {
    tokio::signal::ctrl_c().await?;
    Ok(())
}
