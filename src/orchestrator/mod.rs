// src/orchestrator/mod.rs

//! Build orchestrator.
//!
//! Maps the resolved configuration onto category pipelines and composes them
//! into the published `build`, `start` and `clean` task graphs.
//!
//! - [`toolchain`]: transform chain per asset category.
//! - [`project`]: the task graphs.
//! - [`dev`]: the development session behind `serve`.

pub mod dev;
pub mod project;
pub mod toolchain;

pub use dev::DevSession;
pub use project::Project;
pub use toolchain::Toolchain;
