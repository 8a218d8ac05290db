use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use pageflow::engine::{BindingId, CoordinatorEvent, TaskOutcome};
use pageflow::errors::Result;
use pageflow::exec::BindingExecutor;

/// A fake executor that:
/// - records which bindings were dispatched
/// - after `run_time`, reports `BindingCompleted` with the next scripted
///   outcome (or `Success` once the script runs out).
pub struct FakeExecutor {
    events: mpsc::Sender<CoordinatorEvent>,
    dispatched: Arc<Mutex<Vec<BindingId>>>,
    outcomes: Arc<Mutex<VecDeque<TaskOutcome>>>,
    run_time: Duration,
}

impl FakeExecutor {
    pub fn new(events: mpsc::Sender<CoordinatorEvent>, dispatched: Arc<Mutex<Vec<BindingId>>>) -> Self {
        Self {
            events,
            dispatched,
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            run_time: Duration::ZERO,
        }
    }

    /// How long each simulated run takes.
    pub fn with_run_time(mut self, run_time: Duration) -> Self {
        self.run_time = run_time;
        self
    }

    /// Outcomes handed out to runs in dispatch order.
    pub fn with_outcomes(self, outcomes: impl IntoIterator<Item = TaskOutcome>) -> Self {
        self.outcomes.lock().unwrap().extend(outcomes);
        self
    }
}

impl BindingExecutor for FakeExecutor {
    fn dispatch(&mut self, binding: BindingId) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.events.clone();
        let dispatched = Arc::clone(&self.dispatched);
        let outcomes = Arc::clone(&self.outcomes);
        let run_time = self.run_time;

        Box::pin(async move {
            dispatched.lock().unwrap().push(binding);
            let outcome = outcomes.lock().unwrap().pop_front().unwrap_or(TaskOutcome::Success);

            tokio::spawn(async move {
                if !run_time.is_zero() {
                    tokio::time::sleep(run_time).await;
                }
                let _ = tx
                    .send(CoordinatorEvent::BindingCompleted { binding, outcome })
                    .await;
            });
            Ok(())
        })
    }
}
