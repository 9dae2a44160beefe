//! Integration tests for the migration state machine, run against the
//! in-memory store and a scripted gateway.

mod common;

use assert_matches::assert_matches;
use common::{harness, seed_ready_job, ScriptedGateway};
use vmshift_db::models::JobStatus;
use vmshift_engine::error::EngineError;
use vmshift_engine::events::EngineEvent;
use vmshift_engine::store::{JobStore, JobUpdate, StoreError};

// ---------------------------------------------------------------------------
// Happy path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn successful_run_completes_with_first_candidate_target() {
    let h = harness(ScriptedGateway::default());
    let job = seed_ready_job(&h.store, None).await;

    let outcome = h.orchestrator.execute(job.id).await.unwrap();

    assert_eq!(outcome.job_id, job.id);
    assert_eq!(outcome.vm_name, "db-01");
    assert_eq!(outcome.target_node, "node-a");

    let job = h.store.get_job(job.id).await.unwrap().unwrap();
    assert_eq!(job.status(), JobStatus::Completed);
    assert_eq!(job.progress, 100);
    assert_eq!(job.target_node.as_deref(), Some("node-a"));

    // One entry per phase plus the setup and completion entries, in order.
    let logs = h.store.list_logs_after(job.id, 0).await.unwrap();
    let messages: Vec<&str> = logs.iter().map(|e| e.message.as_str()).collect();
    assert_eq!(messages, common::expected_success_log("node-a"));
}

#[tokio::test]
async fn progress_events_are_monotonic_and_bounded() {
    let h = harness(ScriptedGateway::default());
    let job = seed_ready_job(&h.store, None).await;

    let mut events = h.orchestrator.subscribe();
    h.orchestrator.execute(job.id).await.unwrap();

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let EngineEvent::Progress { percent, .. } = event {
            seen.push(percent);
        }
    }

    assert!(!seen.is_empty());
    assert!(seen.windows(2).all(|w| w[0] <= w[1]), "progress regressed: {seen:?}");
    assert!(seen.iter().all(|p| (0..=100).contains(p)));
    assert_eq!(*seen.last().unwrap(), 100);
}

#[tokio::test]
async fn explicit_target_node_is_never_overridden() {
    let h = harness(ScriptedGateway {
        target_names: vec!["node-b"],
        ..Default::default()
    });
    let job = seed_ready_job(&h.store, Some("node-x")).await;

    let outcome = h.orchestrator.execute(job.id).await.unwrap();

    // The pre-specified target wins over the cluster's first candidate.
    assert_eq!(outcome.target_node, "node-x");
    let job = h.store.get_job(job.id).await.unwrap().unwrap();
    assert_eq!(job.target_node.as_deref(), Some("node-x"));
}

// ---------------------------------------------------------------------------
// Precondition failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_job_is_reported_without_store_writes() {
    let h = harness(ScriptedGateway::default());

    let err = h.orchestrator.execute(404).await.unwrap_err();
    assert_matches!(err, EngineError::JobNotFound(404));
    assert!(h.store.get_job(404).await.unwrap().is_none());
}

#[tokio::test]
async fn missing_vm_context_fails_the_job() {
    let h = harness(ScriptedGateway::default());
    let job = h.store.insert_job("db-01", None, None, None, None).await;

    let err = h.orchestrator.execute(job.id).await.unwrap_err();
    assert_matches!(err, EngineError::MissingContext(_));

    let job = h.store.get_job(job.id).await.unwrap().unwrap();
    assert_eq!(job.status(), JobStatus::Failed);

    let logs = h.store.list_logs_after(job.id, 0).await.unwrap();
    let last = &logs.last().unwrap().message;
    assert!(
        last.starts_with("Failed: missing context:"),
        "unexpected failure entry: {last}",
    );
}

#[tokio::test]
async fn wrong_source_provider_kind_fails_before_connectivity() {
    let h = harness(ScriptedGateway::default());

    // Both providers registered as Proxmox: the source role check trips.
    let source = h
        .store
        .insert_provider("not-a-vcenter", vmshift_db::models::ProviderKind::Proxmox, "pve1")
        .await;
    let dest = h
        .store
        .insert_provider("lab proxmox", vmshift_db::models::ProviderKind::Proxmox, "pve2")
        .await;
    let vm = h.store.insert_vm(source.id, "db-01", "vm-1042").await;
    let job = h
        .store
        .insert_job("db-01", Some(source.id), Some(dest.id), Some(vm.id), None)
        .await;

    let err = h.orchestrator.execute(job.id).await.unwrap_err();
    assert_matches!(err, EngineError::RoleMismatch(_));

    let job = h.store.get_job(job.id).await.unwrap().unwrap();
    assert_eq!(job.status(), JobStatus::Failed);
    // The run never reached the source connectivity checkpoint.
    assert!(job.progress < 10, "progress was {}", job.progress);
}

// ---------------------------------------------------------------------------
// Connectivity failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn source_connectivity_failure_leaves_progress_below_ten() {
    let h = harness(ScriptedGateway {
        source_reachable: false,
        ..Default::default()
    });
    let job = seed_ready_job(&h.store, None).await;

    let err = h.orchestrator.execute(job.id).await.unwrap_err();
    assert_matches!(err, EngineError::Connectivity(_));

    let job = h.store.get_job(job.id).await.unwrap().unwrap();
    assert_eq!(job.status(), JobStatus::Failed);
    assert!(job.progress < 10, "progress was {}", job.progress);

    let logs = h.store.list_logs_after(job.id, 0).await.unwrap();
    let last = &logs.last().unwrap().message;
    assert!(
        last.starts_with("Failed: connectivity error:"),
        "unexpected failure entry: {last}",
    );
}

#[tokio::test]
async fn destination_connectivity_failure_stops_at_ten() {
    let h = harness(ScriptedGateway {
        dest_reachable: false,
        ..Default::default()
    });
    let job = seed_ready_job(&h.store, None).await;

    let err = h.orchestrator.execute(job.id).await.unwrap_err();
    assert_matches!(err, EngineError::Connectivity(_));

    let job = h.store.get_job(job.id).await.unwrap().unwrap();
    assert_eq!(job.status(), JobStatus::Failed);
    // Source check passed (10), destination never confirmed (20).
    assert_eq!(job.progress, 10);

    let logs = h.store.list_logs_after(job.id, 0).await.unwrap();
    assert!(logs
        .iter()
        .any(|e| e.message.contains("connectivity error")));
}

// ---------------------------------------------------------------------------
// Planning failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn empty_candidate_list_without_preset_target_fails_at_twenty() {
    let h = harness(ScriptedGateway {
        target_names: Vec::new(),
        ..Default::default()
    });
    let job = seed_ready_job(&h.store, None).await;

    let err = h.orchestrator.execute(job.id).await.unwrap_err();
    assert_matches!(err, EngineError::NoTargetAvailable);

    let job = h.store.get_job(job.id).await.unwrap().unwrap();
    assert_eq!(job.status(), JobStatus::Failed);
    assert_eq!(job.progress, 20);
    assert!(job.target_node.is_none());

    let logs = h.store.list_logs_after(job.id, 0).await.unwrap();
    assert!(logs
        .iter()
        .any(|e| e.message.contains("Destination node not specified")));
}

#[tokio::test]
async fn empty_candidate_list_with_preset_target_still_completes() {
    let h = harness(ScriptedGateway {
        target_names: Vec::new(),
        ..Default::default()
    });
    let job = seed_ready_job(&h.store, Some("node-x")).await;

    let outcome = h.orchestrator.execute(job.id).await.unwrap();
    assert_eq!(outcome.target_node, "node-x");
}

// ---------------------------------------------------------------------------
// Terminal-state protection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn completed_jobs_accept_no_further_writes() {
    let h = harness(ScriptedGateway::default());
    let job = seed_ready_job(&h.store, None).await;
    h.orchestrator.execute(job.id).await.unwrap();

    let err = h
        .store
        .update_job(job.id, JobUpdate::progress(10))
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::TerminalState(_));

    let job = h.store.get_job(job.id).await.unwrap().unwrap();
    assert_eq!(job.status(), JobStatus::Completed);
    assert_eq!(job.progress, 100);
}

#[tokio::test]
async fn re_executing_a_terminal_job_does_not_mutate_it() {
    let h = harness(ScriptedGateway::default());
    let job = seed_ready_job(&h.store, None).await;
    h.orchestrator.execute(job.id).await.unwrap();

    // A second execution attempt trips over the terminal-state guard on
    // its very first write and changes nothing.
    let err = h.orchestrator.execute(job.id).await.unwrap_err();
    assert_matches!(err, EngineError::Store(StoreError::TerminalState(_)));

    let job = h.store.get_job(job.id).await.unwrap().unwrap();
    assert_eq!(job.status(), JobStatus::Completed);
    assert_eq!(job.progress, 100);
}
