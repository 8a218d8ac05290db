// src/engine/core.rs

//! Pure coordinator state machine.
//!
//! Consumes [`CoordinatorEvent`]s and returns the commands the async shell
//! should carry out. No channels, no Tokio, no IO; every policy decision is
//! testable by feeding events in and inspecting the commands.

use tracing::{debug, warn};

use super::flight::{Admission, FlightTable, Settlement};
use super::{BindingId, CoordinatorEvent, TaskOutcome};

/// Something the shell must do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorCommand {
    /// Start one run of the binding's task.
    Dispatch(BindingId),
    /// A run failed. The binding stays registered.
    ReportFailure {
        binding: BindingId,
        name: String,
        message: String,
    },
}

/// Result of feeding one event to the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorStep {
    pub commands: Vec<CoordinatorCommand>,
    pub keep_running: bool,
}

impl CoordinatorStep {
    fn continue_with(commands: Vec<CoordinatorCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

#[derive(Debug)]
pub struct CoreCoordinator {
    flights: FlightTable,
}

impl CoreCoordinator {
    pub fn new(flights: FlightTable) -> Self {
        Self { flights }
    }

    pub fn flights(&self) -> &FlightTable {
        &self.flights
    }

    pub fn step(&mut self, event: CoordinatorEvent) -> CoordinatorStep {
        match event {
            CoordinatorEvent::BindingTriggered { binding } => self.on_trigger(binding),
            CoordinatorEvent::BindingCompleted { binding, outcome } => {
                self.on_completed(binding, outcome)
            }
            CoordinatorEvent::ShutdownRequested => CoordinatorStep {
                commands: Vec::new(),
                keep_running: false,
            },
        }
    }

    fn on_trigger(&mut self, binding: BindingId) -> CoordinatorStep {
        let commands = match self.flights.admit(binding) {
            Admission::Dispatch => vec![CoordinatorCommand::Dispatch(binding)],
            Admission::Coalesced => {
                debug!(%binding, "binding busy; re-run queued");
                Vec::new()
            }
            Admission::AlreadyDirty => Vec::new(),
            Admission::Unknown => {
                warn!(%binding, "trigger for unknown binding ignored");
                Vec::new()
            }
        };
        CoordinatorStep::continue_with(commands)
    }

    fn on_completed(&mut self, binding: BindingId, outcome: TaskOutcome) -> CoordinatorStep {
        let mut commands = Vec::new();

        if let TaskOutcome::Failed(message) = outcome {
            let name = self.flights.name(binding).unwrap_or("<unknown>").to_string();
            commands.push(CoordinatorCommand::ReportFailure {
                binding,
                name,
                message,
            });
        }

        match self.flights.settle(binding) {
            Settlement::Rerun => commands.push(CoordinatorCommand::Dispatch(binding)),
            Settlement::Idle => {}
            Settlement::Spurious => warn!(%binding, "completion for a binding that was not running"),
        }

        CoordinatorStep::continue_with(commands)
    }
}
