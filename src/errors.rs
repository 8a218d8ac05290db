// src/errors.rs

//! Crate-wide error type and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    /// The project config file could not be read or parsed. Callers fall back
    /// to the built-in default.
    #[error("Configuration load error: {0}")]
    ConfigLoad(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transform '{transform}' failed on {path:?}: {message}")]
    Transform {
        transform: String,
        path: PathBuf,
        message: String,
    },

    #[error("Watch task for binding '{binding}' failed: {message}")]
    WatchTask { binding: String, message: String },

    #[error("Failed to delete {path:?}: {message}")]
    Deletion { path: PathBuf, message: String },

    #[error("Invalid glob pattern '{pattern}': {message}")]
    Glob { pattern: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Task '{task}' panicked or was aborted: {message}")]
    Join { task: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PipelineError {
    pub fn transform(
        transform: impl Into<String>,
        path: impl Into<PathBuf>,
        message: impl std::fmt::Display,
    ) -> Self {
        PipelineError::Transform {
            transform: transform.into(),
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
