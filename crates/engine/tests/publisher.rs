//! Integration tests for poll-based progress subscriptions.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{harness, seed_ready_job, ScriptedGateway};
use futures::StreamExt;
use vmshift_engine::publisher::{JobEvent, ProgressPublisher};
use vmshift_engine::store::JobStore;

/// Poll interval small enough to follow a fast-paced test run live.
const TEST_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Collect a full stream with a test-failure timeout.
async fn collect_all(
    stream: impl futures::Stream<Item = JobEvent> + Send,
) -> Vec<JobEvent> {
    tokio::time::timeout(Duration::from_secs(10), stream.collect::<Vec<_>>())
        .await
        .expect("subscription did not terminate")
}

#[tokio::test]
async fn completed_job_replays_history_progress_and_done() {
    let h = harness(ScriptedGateway::default());
    let job = seed_ready_job(&h.store, None).await;
    h.orchestrator.execute(job.id).await.unwrap();

    let store = Arc::clone(&h.store) as Arc<dyn JobStore>;
    let publisher = ProgressPublisher::with_poll_interval(store, TEST_POLL_INTERVAL);

    let events = collect_all(publisher.subscribe(job.id)).await;

    // Full history first, oldest-first, each entry exactly once.
    let messages: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            JobEvent::Log { message, .. } => Some(message.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(messages, common::expected_success_log("node-a"));

    // Then the current progress and the terminal marker, closing the stream.
    assert_eq!(
        events[events.len() - 2],
        JobEvent::Progress { percent: 100 },
    );
    assert_eq!(
        events[events.len() - 1],
        JobEvent::Done {
            status: "completed"
        },
    );
}

#[tokio::test]
async fn fresh_subscription_replays_but_never_duplicates_within_itself() {
    let h = harness(ScriptedGateway::default());
    let job = seed_ready_job(&h.store, None).await;
    h.orchestrator.execute(job.id).await.unwrap();

    let store = Arc::clone(&h.store) as Arc<dyn JobStore>;
    let publisher = ProgressPublisher::with_poll_interval(store, TEST_POLL_INTERVAL);

    for _ in 0..2 {
        let events = collect_all(publisher.subscribe(job.id)).await;
        let mut entry_ids: Vec<i64> = events
            .iter()
            .filter_map(|e| match e {
                JobEvent::Log { entry_id, .. } => Some(*entry_id),
                _ => None,
            })
            .collect();
        assert_eq!(entry_ids.len(), 10);

        // Strictly increasing ids means no entry was re-emitted.
        let sorted = {
            let mut ids = entry_ids.clone();
            ids.sort_unstable();
            ids.dedup();
            ids
        };
        entry_ids.dedup();
        assert_eq!(entry_ids, sorted);
    }
}

#[tokio::test]
async fn live_subscription_follows_a_run_to_completion() {
    let h = harness(ScriptedGateway::default());
    let job = seed_ready_job(&h.store, None).await;

    let store = Arc::clone(&h.store) as Arc<dyn JobStore>;
    let publisher = ProgressPublisher::with_poll_interval(store, TEST_POLL_INTERVAL);
    let subscription = publisher.subscribe(job.id);

    let orchestrator = Arc::new(h.orchestrator);
    let runner = {
        let orchestrator = Arc::clone(&orchestrator);
        tokio::spawn(async move { orchestrator.execute(job.id).await })
    };

    let events = collect_all(subscription).await;
    runner.await.unwrap().unwrap();

    // Terminal marker closes the stream.
    assert_eq!(
        events.last(),
        Some(&JobEvent::Done {
            status: "completed"
        }),
    );

    // Progress snapshots never regress while following the run.
    let progress: Vec<i16> = events
        .iter()
        .filter_map(|e| match e {
            JobEvent::Progress { percent } => Some(*percent),
            _ => None,
        })
        .collect();
    assert!(progress.windows(2).all(|w| w[0] <= w[1]), "{progress:?}");

    // Every phase label shows up exactly once across the live feed.
    let expected = common::expected_success_log("node-a");
    let messages: Vec<&str> = events
        .iter()
        .filter_map(|e| match e {
            JobEvent::Log { message, .. } => Some(message.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(messages, expected);
}

#[tokio::test]
async fn failed_job_stream_ends_with_failed_status() {
    let h = harness(ScriptedGateway {
        dest_reachable: false,
        ..Default::default()
    });
    let job = seed_ready_job(&h.store, None).await;
    let _ = h.orchestrator.execute(job.id).await;

    let store = Arc::clone(&h.store) as Arc<dyn JobStore>;
    let publisher = ProgressPublisher::with_poll_interval(store, TEST_POLL_INTERVAL);
    let events = collect_all(publisher.subscribe(job.id)).await;

    assert_eq!(
        events.last(),
        Some(&JobEvent::Done { status: "failed" }),
    );
    assert!(events.iter().any(|e| matches!(
        e,
        JobEvent::Log { message, .. } if message.starts_with("Failed: connectivity error:")
    )));
}

#[tokio::test]
async fn subscribing_to_an_unknown_job_ends_immediately() {
    let h = harness(ScriptedGateway::default());
    let store = Arc::clone(&h.store) as Arc<dyn JobStore>;
    let publisher = ProgressPublisher::with_poll_interval(store, TEST_POLL_INTERVAL);

    let events = collect_all(publisher.subscribe(999)).await;
    assert!(events.is_empty());
}
