//! End-to-end tests for the migration pipeline.
//!
//! These exercise the complete flow (pack, plan, migrate) with
//! recording listeners and instrumented stores, across cold starts,
//! resumes, failures, and retries.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use caravan_core::{CHECKPOINT_KEY, Caravan, CheckpointStore, Error, MemoryStore};
use caravan_target::Target;
use caravan_test_utils::{
    CountingStore, Event, FailingStore, RecordingListener, counting_tribe, failing_tribe,
    noop_tribe, recording_tribe, slow_tribe,
};
use pretty_assertions::assert_eq;

#[tokio::test]
async fn test_cold_start_runs_everything_in_order() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let listener = RecordingListener::new();

    // Deliberately shuffled: pack must order them, not the caller.
    let tribes = vec![
        recording_tribe("v2-1-0", Target::literal("2.1.0"), Arc::clone(&log)),
        recording_tribe("always", Target::Always, Arc::clone(&log)),
        recording_tribe("v0-0-1", Target::literal("0.0.1"), Arc::clone(&log)),
        recording_tribe("first", Target::First, Arc::clone(&log)),
        recording_tribe("v1-0-15", Target::literal("1.0.15"), Arc::clone(&log)),
    ];

    let mut caravan =
        Caravan::pack(tribes, MemoryStore::new()).with_listener(listener.clone());

    assert_eq!(caravan.current_target().await.unwrap(), Target::First);
    caravan.migrate().await.unwrap();

    assert_eq!(
        *log.lock().unwrap(),
        vec!["first", "v0-0-1", "v1-0-15", "v2-1-0", "always"]
    );
    assert_eq!(
        caravan.current_target().await.unwrap(),
        Target::literal("2.1.0")
    );
    assert!(listener.finished());
    assert_eq!(listener.migrated_targets().len(), 5);
}

#[tokio::test]
async fn test_resume_plans_only_tribes_above_checkpoint() {
    let mut store = MemoryStore::new();
    store.set(CHECKPOINT_KEY, "2.1.0").await.unwrap();

    let caravan = Caravan::pack(
        vec![
            noop_tribe("v0-0-1", Target::literal("0.0.1")),
            noop_tribe("v1-0-15", Target::literal("1.0.15")),
            noop_tribe("v2-1-0", Target::literal("2.1.0")),
            noop_tribe("v3-1-0", Target::literal("3.1.0")),
        ],
        store,
    );

    let plan = caravan.plan().await.unwrap();
    let names: Vec<_> = plan.iter().map(|tribe| tribe.name()).collect();
    assert_eq!(names, vec!["v3-1-0"]);
}

#[tokio::test]
async fn test_always_recurs_on_every_invocation() {
    let always_runs = Arc::new(AtomicUsize::new(0));
    let literal_runs = Arc::new(AtomicUsize::new(0));

    let mut caravan = Caravan::pack(
        vec![
            counting_tribe("always", Target::Always, Arc::clone(&always_runs)),
            counting_tribe("v1", Target::literal("1.0.0"), Arc::clone(&literal_runs)),
        ],
        MemoryStore::new(),
    );

    caravan.migrate().await.unwrap();
    caravan.migrate().await.unwrap();

    assert_eq!(always_runs.load(Ordering::SeqCst), 2);
    assert_eq!(literal_runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_tribe_below_checkpoint_is_skipped_even_if_it_would_fail() {
    let mut caravan = Caravan::pack(
        vec![
            noop_tribe("v1-0-15", Target::literal("1.0.15")),
            noop_tribe("v2-1-0", Target::literal("2.1.0")),
            noop_tribe("v3-1-0", Target::literal("3.1.0")),
        ],
        MemoryStore::new(),
    );
    caravan.migrate().await.unwrap();

    // A late-registered tribe below the checkpoint never runs, even one
    // whose action would fail.
    let mut caravan = caravan.repack(vec![
        noop_tribe("v1-0-15", Target::literal("1.0.15")),
        noop_tribe("v2-1-0", Target::literal("2.1.0")),
        noop_tribe("v3-1-0", Target::literal("3.1.0")),
        failing_tribe("v3-0-0", Target::literal("3.0.0"), "must not run"),
    ]);
    caravan.migrate().await.unwrap();

    assert_eq!(
        caravan.current_target().await.unwrap(),
        Target::literal("3.1.0")
    );
}

#[tokio::test]
async fn test_halt_on_failure_keeps_checkpoint_and_notifies_once() {
    let listener = RecordingListener::new();

    let mut caravan = Caravan::pack(
        vec![
            noop_tribe("v1-0-15", Target::literal("1.0.15")),
            noop_tribe("v2-1-0", Target::literal("2.1.0")),
            failing_tribe("v3-0-0", Target::literal("3.0.0"), "tribe refused to move"),
        ],
        MemoryStore::new(),
    )
    .with_listener(listener.clone());

    let err = caravan.migrate().await.unwrap_err();
    assert!(matches!(err, Error::TribeMigrationFailed(_)));

    // Checkpoint stays where the last success left it.
    assert_eq!(
        caravan.current_target().await.unwrap(),
        Target::literal("2.1.0")
    );

    // Exactly two successes and one interruption were observed.
    assert_eq!(
        listener.migrated_targets(),
        vec![Target::literal("1.0.15"), Target::literal("2.1.0")]
    );
    let interruptions = listener.interruptions();
    assert_eq!(interruptions.len(), 1);
    assert!(interruptions[0].contains("tribe refused to move"));
    assert!(!listener.finished());
}

#[tokio::test]
async fn test_tribes_after_the_failing_one_never_run() {
    let late_runs = Arc::new(AtomicUsize::new(0));

    let mut caravan = Caravan::pack(
        vec![
            failing_tribe("v1", Target::literal("1.0.0"), "boom"),
            counting_tribe("v2", Target::literal("2.0.0"), Arc::clone(&late_runs)),
            counting_tribe("always", Target::Always, Arc::clone(&late_runs)),
        ],
        MemoryStore::new(),
    );

    caravan.migrate().await.unwrap_err();
    assert_eq!(late_runs.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_fully_caught_up_run_finishes_with_empty_plan() {
    let mut store = MemoryStore::new();
    store.set(CHECKPOINT_KEY, "3.0.0").await.unwrap();

    let listener = RecordingListener::new();
    let mut caravan = Caravan::pack(
        vec![
            noop_tribe("first", Target::First),
            noop_tribe("v1", Target::literal("1.0.0")),
        ],
        store,
    )
    .with_listener(listener.clone());

    assert!(caravan.plan().await.unwrap().is_empty());
    caravan.migrate().await.unwrap();

    assert_eq!(listener.events(), vec![Event::WillStart, Event::DidFinish]);
}

#[tokio::test]
async fn test_store_flushes_exactly_once_per_invocation() {
    let store = CountingStore::new(MemoryStore::new());
    let flushes = store.flushes();

    let mut caravan = Caravan::pack(vec![noop_tribe("v1", Target::literal("1.0.0"))], store);
    caravan.migrate().await.unwrap();
    assert_eq!(flushes.load(Ordering::SeqCst), 1);

    // A failing run still flushes exactly once.
    let store = CountingStore::new(MemoryStore::new());
    let flushes = store.flushes();
    let mut caravan = Caravan::pack(vec![failing_tribe("v1", Target::literal("1.0.0"), "boom")], store);
    caravan.migrate().await.unwrap_err();
    assert_eq!(flushes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_retry_after_repack_resumes_from_checkpoint() {
    let v1_runs = Arc::new(AtomicUsize::new(0));

    let mut caravan = Caravan::pack(
        vec![
            counting_tribe("v1", Target::literal("1.0.0"), Arc::clone(&v1_runs)),
            failing_tribe("v2", Target::literal("2.0.0"), "not yet"),
        ],
        MemoryStore::new(),
    );

    caravan.migrate().await.unwrap_err();
    assert_eq!(
        caravan.current_target().await.unwrap(),
        Target::literal("1.0.0")
    );

    // Re-register with the offending tribe fixed and retry.
    let mut caravan = caravan.repack(vec![
        counting_tribe("v1", Target::literal("1.0.0"), Arc::clone(&v1_runs)),
        noop_tribe("v2", Target::literal("2.0.0")),
    ]);
    caravan.migrate().await.unwrap();

    assert_eq!(
        caravan.current_target().await.unwrap(),
        Target::literal("2.0.0")
    );
    // The already-applied tribe was filtered out on the retry.
    assert_eq!(v1_runs.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_equal_targets_keep_declaration_order_and_both_run() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let mut caravan = Caravan::pack(
        vec![
            recording_tribe("a", Target::literal("1.0.0"), Arc::clone(&log)),
            recording_tribe("b", Target::literal("1.0.0+build.7"), Arc::clone(&log)),
        ],
        MemoryStore::new(),
    );

    caravan.migrate().await.unwrap();
    assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
}

#[tokio::test]
async fn test_slow_tribe_settles_before_the_next_starts() {
    let log = Arc::new(Mutex::new(Vec::new()));

    let slow = slow_tribe("slow", Target::literal("1.0.0"), Duration::from_millis(50));
    let mut caravan = Caravan::pack(
        vec![
            slow,
            recording_tribe("after", Target::literal("2.0.0"), Arc::clone(&log)),
        ],
        MemoryStore::new(),
    );

    caravan.migrate().await.unwrap();

    // The fast tribe only ran after the slow one had fully settled and
    // advanced the checkpoint past it.
    assert_eq!(*log.lock().unwrap(), vec!["after"]);
    assert_eq!(
        caravan.current_target().await.unwrap(),
        Target::literal("2.0.0")
    );
}

#[tokio::test]
async fn test_checkpoint_set_failure_interrupts_as_store_error() {
    let listener = RecordingListener::new();

    let mut caravan = Caravan::pack(
        vec![noop_tribe("v1", Target::literal("1.0.0"))],
        FailingStore::failing_set(),
    )
    .with_listener(listener.clone());

    let err = caravan.migrate().await.unwrap_err();
    assert!(matches!(err, Error::Store(_)));

    // The tribe succeeded but its checkpoint never landed, so only the
    // interruption was observed, not a did_migrate.
    assert!(listener.migrated_targets().is_empty());
    assert_eq!(listener.interruptions().len(), 1);
}

#[tokio::test]
async fn test_flush_failure_after_success_interrupts() {
    let listener = RecordingListener::new();

    let mut caravan = Caravan::pack(
        vec![noop_tribe("v1", Target::literal("1.0.0"))],
        FailingStore::failing_flush(),
    )
    .with_listener(listener.clone());

    let err = caravan.migrate().await.unwrap_err();
    assert!(matches!(err, Error::Store(_)));

    // All tribes ran; the pipeline was interrupted only at the final
    // synchronization step.
    assert_eq!(listener.migrated_targets(), vec![Target::literal("1.0.0")]);
    assert!(!listener.finished());
}
