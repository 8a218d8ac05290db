// src/watch/mod.rs

//! File watching and change routing.
//!
//! This module is responsible for:
//! - Registering watch bindings (pattern set + options + task).
//! - Compiling binding patterns (`globset`, `!` for exclusions).
//! - Subscribing to binding roots with `notify` and turning changes into
//!   `CoordinatorEvent::BindingTriggered`.
//! - Optionally dropping events whose file content did not change.
//!
//! It does not decide when tasks run; single-flight lives in
//! [`crate::engine`].

pub mod binding;
pub mod event_handler;
pub mod hash;
pub mod path_utils;
pub mod patterns;
pub mod watcher;

pub use binding::{BindingRegistry, WatchBinding, WatchOptions};
pub use event_handler::route_event;
pub use hash::ContentFilter;
pub use patterns::PatternSet;
pub use watcher::{spawn_watcher, WatcherHandle};
