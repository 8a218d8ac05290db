// src/dag/mod.rs

//! Task graph construction and execution.
//!
//! - [`task`] holds the [`Task`] value (leaf or composite) and the
//!   [`series`] / [`parallel`] combinators.
//! - [`executor`] interprets a task tree: ordering for `series`, fan-out
//!   without cancellation for `parallel`.

pub mod executor;
pub mod task;

pub use task::{parallel, series, CompositeKind, Task, TaskEffect, TaskFuture};
