use async_trait::async_trait;
use ionman_dns_domain::{DomainError, QueryEvent, ResolverEvent};
use ionman_dns_application::ports::{QueryLogRepository, ResolverLogRepository};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Anything that can persist a batch of events in one bulk insert.
#[async_trait]
pub trait BatchSink<E>: Send + Sync {
    async fn persist(&self, batch: &[E]) -> Result<(), DomainError>;
}

#[async_trait]
impl<T: QueryLogRepository + ?Sized> BatchSink<QueryEvent> for T {
    async fn persist(&self, batch: &[QueryEvent]) -> Result<(), DomainError> {
        self.log_batch(batch).await
    }
}

#[async_trait]
impl<T: ResolverLogRepository + ?Sized> BatchSink<ResolverEvent> for T {
    async fn persist(&self, batch: &[ResolverEvent]) -> Result<(), DomainError> {
        self.log_batch(batch).await
    }
}

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub max_batch_size: usize,
    /// Back-off after a failed persist; the dropped batch is not retried.
    pub retry_backoff: Duration,
    /// Deadline for draining the queue on shutdown.
    pub shutdown_drain: Duration,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            max_batch_size: 500,
            retry_backoff: Duration::from_secs(1),
            shutdown_drain: Duration::from_secs(2),
        }
    }
}

/// Producer half of the event queue. Never blocks the data path: overflow
/// drops the event and bumps the counter.
pub struct EventSender<E> {
    tx: mpsc::Sender<E>,
    dropped: Arc<AtomicU64>,
}

impl<E> Clone for EventSender<E> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            dropped: self.dropped.clone(),
        }
    }
}

impl<E> EventSender<E> {
    pub fn log(&self, event: E) {
        if self.tx.try_send(event).is_err() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Create the bounded event queue shared by producers and one consumer.
pub fn event_queue<E>(capacity: usize) -> (EventSender<E>, mpsc::Receiver<E>) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        EventSender {
            tx,
            dropped: Arc::new(AtomicU64::new(0)),
        },
        rx,
    )
}

/// Single consumer that batches queued events into bulk inserts.
///
/// Events are observability, not system-of-record: a failed persist drops
/// the batch, backs off briefly, and resumes. The pool underneath
/// reconnects lazily.
pub struct EventLogger<E> {
    sink: Arc<dyn BatchSink<E>>,
    config: LoggerConfig,
}

impl<E: Send + 'static> EventLogger<E> {
    pub fn new(sink: Arc<dyn BatchSink<E>>, config: LoggerConfig) -> Self {
        Self { sink, config }
    }

    /// Spawn the background consumer. It exits when the shutdown token
    /// fires or every sender is dropped, draining best-effort either way.
    pub fn start(
        self,
        mut rx: mpsc::Receiver<E>,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut batch: Vec<E> = Vec::with_capacity(self.config.max_batch_size);
            let mut flushed = 0u64;
            let mut batches = 0u64;

            loop {
                let first = tokio::select! {
                    _ = shutdown.cancelled() => break,
                    maybe = rx.recv() => match maybe {
                        Some(event) => event,
                        None => break,
                    },
                };

                batch.push(first);
                while batch.len() < self.config.max_batch_size {
                    match rx.try_recv() {
                        Ok(event) => batch.push(event),
                        Err(_) => break,
                    }
                }

                match self.sink.persist(&batch).await {
                    Ok(()) => {
                        flushed += batch.len() as u64;
                        batches += 1;
                        batch.clear();
                    }
                    Err(e) => {
                        warn!(error = %e, dropped = batch.len(), "Log batch persist failed; dropping batch");
                        batch.clear();
                        tokio::time::sleep(self.config.retry_backoff).await;
                    }
                }
            }

            self.drain(&mut rx, &mut batch).await;
            info!(flushed, batches, "Event logger shut down");
        })
    }

    /// Best-effort shutdown drain within the configured deadline.
    async fn drain(&self, rx: &mut mpsc::Receiver<E>, batch: &mut Vec<E>) {
        let deadline = tokio::time::Instant::now() + self.config.shutdown_drain;
        loop {
            while batch.len() < self.config.max_batch_size {
                match rx.try_recv() {
                    Ok(event) => batch.push(event),
                    Err(_) => break,
                }
            }
            if batch.is_empty() {
                return;
            }
            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                debug!(left = batch.len(), "Shutdown drain deadline reached");
                return;
            }
            match tokio::time::timeout(remaining, self.sink.persist(batch)).await {
                Ok(Ok(())) => batch.clear(),
                _ => return,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use tokio::sync::Mutex;

    #[derive(Default)]
    struct RecordingSink {
        batches: Mutex<Vec<usize>>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl BatchSink<u32> for RecordingSink {
        async fn persist(&self, batch: &[u32]) -> Result<(), DomainError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(DomainError::DatabaseError("sink down".into()));
            }
            self.batches.lock().await.push(batch.len());
            Ok(())
        }
    }

    fn config() -> LoggerConfig {
        LoggerConfig {
            max_batch_size: 500,
            retry_backoff: Duration::from_millis(10),
            shutdown_drain: Duration::from_secs(1),
        }
    }

    #[tokio::test]
    async fn n_events_persist_in_at_most_n_over_batch_inserts() {
        let sink = Arc::new(RecordingSink::default());
        let (sender, rx) = event_queue::<u32>(50_000);

        // Queue everything before the consumer starts so batching is full.
        for i in 0..1250u32 {
            sender.log(i);
        }
        drop(sender);

        let logger = EventLogger::new(sink.clone(), config());
        logger.start(rx, CancellationToken::new()).await.unwrap();

        let batches = sink.batches.lock().await;
        let total: usize = batches.iter().sum();
        assert_eq!(total, 1250);
        assert!(batches.len() <= 3, "expected ≤⌈1250/500⌉ inserts, got {}", batches.len());
        assert!(batches.iter().all(|&size| size <= 500));
    }

    #[tokio::test]
    async fn overflow_drops_events_and_counts_them() {
        let (sender, _rx) = event_queue::<u32>(5);
        for i in 0..9u32 {
            sender.log(i);
        }
        assert_eq!(sender.dropped(), 4);
    }

    #[tokio::test]
    async fn persist_failure_drops_batch_and_recovers() {
        let sink = Arc::new(RecordingSink::default());
        sink.fail.store(true, Ordering::SeqCst);
        let (sender, rx) = event_queue::<u32>(100);
        let shutdown = CancellationToken::new();
        let handle = EventLogger::new(sink.clone(), config()).start(rx, shutdown.clone());

        sender.log(1);
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Sink recovers; the lost event stays lost, new ones land.
        sink.fail.store(false, Ordering::SeqCst);
        sender.log(2);
        sender.log(3);
        tokio::time::sleep(Duration::from_millis(100)).await;

        shutdown.cancel();
        handle.await.unwrap();

        let batches = sink.batches.lock().await;
        let total: usize = batches.iter().sum();
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn shutdown_drains_queued_events() {
        let sink = Arc::new(RecordingSink::default());
        let (sender, rx) = event_queue::<u32>(100);
        let shutdown = CancellationToken::new();

        for i in 0..10u32 {
            sender.log(i);
        }
        shutdown.cancel();

        EventLogger::new(sink.clone(), config())
            .start(rx, shutdown)
            .await
            .unwrap();

        let batches = sink.batches.lock().await;
        let total: usize = batches.iter().sum();
        assert_eq!(total, 10);
    }
}
