use ionman_dns_jobs::PortSyncJob;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;

mod helpers;
use helpers::mock_ports::MockPortSync;

#[tokio::test]
async fn trigger_runs_a_sync_cycle() {
    let sync = Arc::new(MockPortSync::new());
    let trigger = Arc::new(Notify::new());
    let job = PortSyncJob::new(sync.clone(), trigger.clone())
        .with_interval(3600)
        .with_autodetect_cycles(0);

    Arc::new(job).start().await;
    trigger.notify_one();
    sleep(Duration::from_millis(100)).await;

    assert_eq!(sync.syncs.load(Ordering::SeqCst), 1);
    assert_eq!(sync.autodetects.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn interval_drives_cycles() {
    let sync = Arc::new(MockPortSync::new());
    let job = PortSyncJob::new(sync.clone(), Arc::new(Notify::new()))
        .with_interval(1)
        .with_autodetect_cycles(0);

    Arc::new(job).start().await;
    sleep(Duration::from_millis(1200)).await;

    assert!(sync.syncs.load(Ordering::SeqCst) >= 1);
}

#[tokio::test]
async fn autodetect_runs_every_nth_cycle() {
    let sync = Arc::new(MockPortSync::new());
    let trigger = Arc::new(Notify::new());
    let job = PortSyncJob::new(sync.clone(), trigger.clone())
        .with_interval(3600)
        .with_autodetect_cycles(2);

    Arc::new(job).start().await;
    for _ in 0..4 {
        trigger.notify_one();
        sleep(Duration::from_millis(80)).await;
    }

    assert_eq!(sync.syncs.load(Ordering::SeqCst), 4);
    assert_eq!(sync.autodetects.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn burst_of_triggers_coalesces() {
    let sync = Arc::new(MockPortSync::new());
    let trigger = Arc::new(Notify::new());
    let job = PortSyncJob::new(sync.clone(), trigger.clone())
        .with_interval(3600)
        .with_autodetect_cycles(0);

    Arc::new(job).start().await;
    // Rapid-fire notifications collapse into at most one queued permit.
    for _ in 0..10 {
        trigger.notify_one();
    }
    sleep(Duration::from_millis(200)).await;

    assert!(sync.syncs.load(Ordering::SeqCst) <= 2);
}

#[tokio::test]
async fn cancellation_stops_cycles() {
    let sync = Arc::new(MockPortSync::new());
    let trigger = Arc::new(Notify::new());
    let token = CancellationToken::new();
    let job = PortSyncJob::new(sync.clone(), trigger.clone())
        .with_interval(3600)
        .with_autodetect_cycles(0)
        .with_cancellation(token.clone());

    Arc::new(job).start().await;
    token.cancel();
    sleep(Duration::from_millis(50)).await;

    trigger.notify_one();
    sleep(Duration::from_millis(100)).await;

    assert_eq!(sync.syncs.load(Ordering::SeqCst), 0);
}
