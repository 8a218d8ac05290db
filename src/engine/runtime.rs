// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::errors::{PipelineError, Result};
use crate::exec::BindingExecutor;

use super::core::{CoordinatorCommand, CoreCoordinator};
use super::CoordinatorEvent;

/// Async shell around [`CoreCoordinator`].
///
/// Reads events from the channel, feeds them to the core and hands dispatch
/// commands to the executor backend. Runs until shutdown is requested or
/// every sender is gone.
pub struct Coordinator<E: BindingExecutor> {
    core: CoreCoordinator,
    event_rx: mpsc::Receiver<CoordinatorEvent>,
    executor: E,
}

impl<E: BindingExecutor> fmt::Debug for Coordinator<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: BindingExecutor> Coordinator<E> {
    pub fn new(core: CoreCoordinator, event_rx: mpsc::Receiver<CoordinatorEvent>, executor: E) -> Self {
        Self {
            core,
            event_rx,
            executor,
        }
    }

    pub async fn run(mut self) -> Result<()> {
        info!("watch coordinator started");

        while let Some(event) = self.event_rx.recv().await {
            debug!(?event, "coordinator received event");

            let step = self.core.step(event);
            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                info!("shutdown requested; stopping watch coordinator");
                return Ok(());
            }
        }

        info!("coordinator event channel closed; exiting");
        Ok(())
    }

    async fn execute_command(&mut self, command: CoordinatorCommand) -> Result<()> {
        match command {
            CoordinatorCommand::Dispatch(binding) => self.executor.dispatch(binding).await,
            CoordinatorCommand::ReportFailure {
                binding,
                name,
                message,
            } => {
                let err = PipelineError::WatchTask {
                    binding: name,
                    message,
                };
                warn!(%binding, error = %err, "watch task failed; binding remains active");
                Ok(())
            }
        }
    }
}
