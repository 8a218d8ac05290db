use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::sleep;

use pageflow::engine::{BindingId, Coordinator, CoordinatorEvent, CoreCoordinator, FlightTable, TaskOutcome};
use pageflow_test_utils::{init_tracing, with_timeout, FakeExecutor};

fn trigger(id: usize) -> CoordinatorEvent {
    CoordinatorEvent::BindingTriggered {
        binding: BindingId(id),
    }
}

fn table(names: &[&str]) -> FlightTable {
    FlightTable::new(names.iter().enumerate().map(|(i, n)| (BindingId(i), *n)))
}

#[tokio::test]
async fn burst_of_events_during_a_run_collapses_to_one_rerun() {
    init_tracing();
    let (tx, rx) = mpsc::channel(64);
    let dispatched = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(tx.clone(), Arc::clone(&dispatched))
        .with_run_time(Duration::from_millis(100));

    let coordinator = Coordinator::new(CoreCoordinator::new(table(&["styles"])), rx, executor);
    let handle = tokio::spawn(coordinator.run());

    for _ in 0..10 {
        tx.send(trigger(0)).await.unwrap();
    }
    sleep(Duration::from_millis(400)).await;
    tx.send(CoordinatorEvent::ShutdownRequested).await.unwrap();

    with_timeout(handle).await.unwrap().unwrap();
    assert_eq!(*dispatched.lock().unwrap(), vec![BindingId(0), BindingId(0)]);
}

#[tokio::test]
async fn single_event_runs_once() {
    init_tracing();
    let (tx, rx) = mpsc::channel(64);
    let dispatched = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(tx.clone(), Arc::clone(&dispatched))
        .with_run_time(Duration::from_millis(20));

    let handle = tokio::spawn(
        Coordinator::new(CoreCoordinator::new(table(&["pages"])), rx, executor).run(),
    );

    tx.send(trigger(0)).await.unwrap();
    sleep(Duration::from_millis(150)).await;
    tx.send(CoordinatorEvent::ShutdownRequested).await.unwrap();

    with_timeout(handle).await.unwrap().unwrap();
    assert_eq!(dispatched.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn failed_run_leaves_binding_active() {
    init_tracing();
    let (tx, rx) = mpsc::channel(64);
    let dispatched = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(tx.clone(), Arc::clone(&dispatched))
        .with_outcomes([TaskOutcome::Failed("template error".into())]);

    let handle = tokio::spawn(
        Coordinator::new(CoreCoordinator::new(table(&["pages"])), rx, executor).run(),
    );

    tx.send(trigger(0)).await.unwrap();
    sleep(Duration::from_millis(50)).await;
    tx.send(trigger(0)).await.unwrap();
    sleep(Duration::from_millis(50)).await;
    tx.send(CoordinatorEvent::ShutdownRequested).await.unwrap();

    with_timeout(handle).await.unwrap().unwrap();
    assert_eq!(dispatched.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn bindings_run_concurrently_and_independently() {
    init_tracing();
    let (tx, rx) = mpsc::channel(64);
    let dispatched = Arc::new(Mutex::new(Vec::new()));
    let executor = FakeExecutor::new(tx.clone(), Arc::clone(&dispatched))
        .with_run_time(Duration::from_millis(100));

    let handle = tokio::spawn(
        Coordinator::new(CoreCoordinator::new(table(&["pages", "scripts"])), rx, executor).run(),
    );

    tx.send(trigger(0)).await.unwrap();
    tx.send(trigger(1)).await.unwrap();
    sleep(Duration::from_millis(30)).await;
    // Both started without waiting for each other.
    assert_eq!(*dispatched.lock().unwrap(), vec![BindingId(0), BindingId(1)]);

    tx.send(trigger(1)).await.unwrap();
    sleep(Duration::from_millis(300)).await;
    tx.send(CoordinatorEvent::ShutdownRequested).await.unwrap();

    with_timeout(handle).await.unwrap().unwrap();
    let runs = dispatched.lock().unwrap().clone();
    assert_eq!(runs.iter().filter(|b| **b == BindingId(0)).count(), 1);
    assert_eq!(runs.iter().filter(|b| **b == BindingId(1)).count(), 2);
}
