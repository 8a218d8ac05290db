// src/engine/mod.rs

//! Watch coordinator engine.
//!
//! Turns binding triggers into task runs while enforcing single-flight per
//! binding: a trigger that arrives while the binding's task is running marks
//! it dirty, and a dirty binding runs exactly once more when the current run
//! finishes.
//!
//! The pure state machine lives in [`core`] (with the per-binding state in
//! [`flight`]); the async shell that reads events and talks to an executor
//! backend is [`runtime`].

use std::fmt;

/// Identifies a registered watch binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindingId(pub usize);

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of one run of a binding's task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    Failed(String),
}

/// Events flowing into the coordinator from the watcher, the executor and
/// the signal handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoordinatorEvent {
    /// A watched path matching the binding changed.
    BindingTriggered { binding: BindingId },
    /// A run started by the coordinator finished.
    BindingCompleted {
        binding: BindingId,
        outcome: TaskOutcome,
    },
    /// Ctrl-C or an explicit stop.
    ShutdownRequested,
}

pub mod core;
pub mod flight;
pub mod runtime;

pub use core::{CoordinatorCommand, CoordinatorStep, CoreCoordinator};
pub use flight::{Admission, FlightState, FlightTable, Settlement};
pub use runtime::Coordinator;
