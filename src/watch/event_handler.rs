// src/watch/event_handler.rs

//! Mapping raw `notify` events to binding triggers.

use notify::{Event, EventKind};
use tracing::trace;

use crate::engine::BindingId;
use crate::watch::binding::BindingRegistry;
use crate::watch::hash::ContentFilter;
use crate::watch::path_utils::relative_str;

/// Bindings triggered by one filesystem event, each at most once, in
/// registration order of first match.
pub fn route_event(registry: &BindingRegistry, filter: &mut ContentFilter, event: &Event) -> Vec<BindingId> {
    if matches!(event.kind, EventKind::Access(_)) {
        return Vec::new();
    }

    let mut triggered = Vec::new();
    for path in &event.paths {
        for binding in registry.iter() {
            if triggered.contains(&binding.id()) {
                continue;
            }
            let Some(rel) = relative_str(&binding.options().cwd, path) else {
                continue;
            };
            if !binding.matches(&rel) {
                continue;
            }
            if binding.options().use_hash && !filter.should_trigger(binding.id(), path) {
                continue;
            }
            trace!(binding = binding.name(), path = %rel, "path matched binding");
            triggered.push(binding.id());
        }
    }
    triggered
}
