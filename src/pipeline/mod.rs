// src/pipeline/mod.rs

//! Read -> transform chain -> write.
//!
//! - [`glob`] expands a pattern under a base directory.
//! - [`entry`] is the unit flowing through a pipeline.
//! - [`transform`] defines the transform contract and generic stages
//!   (closures, passthrough, extension rename, conditional branches).
//! - [`runner`] turns a [`PipelineSpec`] into a [`crate::dag::Task`].

pub mod entry;
pub mod glob;
pub mod runner;
pub mod transform;

pub use entry::{is_contained, FileEntry};
pub use runner::{apply_chain, execute, process, run_pipeline, PipelineReport, PipelineSpec};
pub use transform::{
    Conditional, FnTransform, Passthrough, PathGuard, RenameExtension, Transform, TransformOutput,
};
