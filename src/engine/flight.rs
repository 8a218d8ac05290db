// src/engine/flight.rs

use std::collections::BTreeMap;

use super::BindingId;

/// Per-binding run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightState {
    Idle,
    Running,
    /// Running, and at least one trigger arrived since the run started.
    RunningDirty,
}

/// What to do with a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Binding was idle; start a run now.
    Dispatch,
    /// Binding is running; one re-run is now pending.
    Coalesced,
    /// Binding is running and a re-run was already pending.
    AlreadyDirty,
    Unknown,
}

/// What to do when a run finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    /// Start the pending re-run.
    Rerun,
    Idle,
    /// Completion for a binding that was not running.
    Spurious,
}

#[derive(Debug)]
struct Slot {
    name: String,
    state: FlightState,
}

/// Single-flight bookkeeping for every binding.
#[derive(Debug, Default)]
pub struct FlightTable {
    slots: BTreeMap<BindingId, Slot>,
}

impl FlightTable {
    pub fn new<I, S>(bindings: I) -> Self
    where
        I: IntoIterator<Item = (BindingId, S)>,
        S: Into<String>,
    {
        let slots = bindings
            .into_iter()
            .map(|(id, name)| {
                (
                    id,
                    Slot {
                        name: name.into(),
                        state: FlightState::Idle,
                    },
                )
            })
            .collect();
        Self { slots }
    }

    pub fn state(&self, binding: BindingId) -> Option<FlightState> {
        self.slots.get(&binding).map(|s| s.state)
    }

    pub fn name(&self, binding: BindingId) -> Option<&str> {
        self.slots.get(&binding).map(|s| s.name.as_str())
    }

    pub fn all_idle(&self) -> bool {
        self.slots.values().all(|s| s.state == FlightState::Idle)
    }

    pub fn admit(&mut self, binding: BindingId) -> Admission {
        let Some(slot) = self.slots.get_mut(&binding) else {
            return Admission::Unknown;
        };
        match slot.state {
            FlightState::Idle => {
                slot.state = FlightState::Running;
                Admission::Dispatch
            }
            FlightState::Running => {
                slot.state = FlightState::RunningDirty;
                Admission::Coalesced
            }
            FlightState::RunningDirty => Admission::AlreadyDirty,
        }
    }

    pub fn settle(&mut self, binding: BindingId) -> Settlement {
        let Some(slot) = self.slots.get_mut(&binding) else {
            return Settlement::Spurious;
        };
        match slot.state {
            FlightState::Idle => Settlement::Spurious,
            FlightState::Running => {
                slot.state = FlightState::Idle;
                Settlement::Idle
            }
            FlightState::RunningDirty => {
                slot.state = FlightState::Running;
                Settlement::Rerun
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trigger_while_running_marks_dirty_once() {
        let id = BindingId(0);
        let mut table = FlightTable::new([(id, "pages")]);

        assert_eq!(table.admit(id), Admission::Dispatch);
        assert_eq!(table.admit(id), Admission::Coalesced);
        assert_eq!(table.admit(id), Admission::AlreadyDirty);
        assert_eq!(table.state(id), Some(FlightState::RunningDirty));

        assert_eq!(table.settle(id), Settlement::Rerun);
        assert_eq!(table.state(id), Some(FlightState::Running));
        assert_eq!(table.settle(id), Settlement::Idle);
        assert!(table.all_idle());
    }

    #[test]
    fn unknown_bindings_are_reported() {
        let mut table = FlightTable::default();
        assert_eq!(table.admit(BindingId(7)), Admission::Unknown);
        assert_eq!(table.settle(BindingId(7)), Settlement::Spurious);
    }
}
