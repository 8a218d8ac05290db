// src/exec/backend.rs

//! Pluggable executor backend for the watch coordinator.
//!
//! The coordinator talks to a `BindingExecutor` instead of spawning tasks
//! itself, so tests can swap in a fake that records dispatches and replies
//! with scripted completions.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::{BindingId, CoordinatorEvent, TaskOutcome};
use crate::errors::{PipelineError, Result};
use crate::watch::BindingRegistry;

/// Starts runs of bound tasks.
///
/// `dispatch` must return promptly; the run itself continues in the
/// background and reports back with `CoordinatorEvent::BindingCompleted`.
pub trait BindingExecutor: Send {
    fn dispatch(&mut self, binding: BindingId) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Production backend: runs the binding's [`crate::dag::Task`] on the Tokio
/// runtime.
#[derive(Debug)]
pub struct TaskBindingExecutor {
    registry: Arc<BindingRegistry>,
    events: mpsc::Sender<CoordinatorEvent>,
}

impl TaskBindingExecutor {
    pub fn new(registry: Arc<BindingRegistry>, events: mpsc::Sender<CoordinatorEvent>) -> Self {
        Self { registry, events }
    }
}

impl BindingExecutor for TaskBindingExecutor {
    fn dispatch(&mut self, binding: BindingId) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let found = self
            .registry
            .get(binding)
            .map(|b| (b.name().to_string(), b.task().clone()));
        let events = self.events.clone();

        Box::pin(async move {
            let Some((name, task)) = found else {
                return Err(PipelineError::WatchTask {
                    binding: binding.to_string(),
                    message: "binding is not registered".to_string(),
                });
            };

            debug!(%binding, binding_name = %name, "dispatching watch task");
            tokio::spawn(async move {
                let outcome = match task.run().await {
                    Ok(()) => TaskOutcome::Success,
                    Err(err) => TaskOutcome::Failed(err.to_string()),
                };
                if events
                    .send(CoordinatorEvent::BindingCompleted { binding, outcome })
                    .await
                    .is_err()
                {
                    warn!(binding_name = %name, "coordinator gone before completion was reported");
                }
            });
            Ok(())
        })
    }
}
