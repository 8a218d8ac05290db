// src/exec/mod.rs

//! Execution layer for watch bindings.
//!
//! [`backend`] provides the [`BindingExecutor`] trait the coordinator
//! dispatches through, and [`TaskBindingExecutor`], which runs the bound task
//! and reports completion back as a coordinator event.

pub mod backend;

pub use backend::{BindingExecutor, TaskBindingExecutor};
