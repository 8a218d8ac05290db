// src/config/mod.rs

//! Configuration loading and validation for pageflow.
//!
//! Responsibilities:
//! - Define the built-in defaults, the partial override read from TOML, and
//!   the resolved, read-only [`BuildConfig`] (`model.rs`).
//! - Load the optional project override through an injected
//!   [`ConfigSource`] (`loader.rs`).
//! - Validate required fields before anything runs (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{load_config, parse_partial, ConfigSource, FileConfigSource, StaticConfigSource};
pub use model::{
    BuildConfig, PartialBuildSection, PartialConfig, PartialPaths, PartialServerSection,
    PathPatterns, RawBuildConfig, ServerSettings,
};
pub use validate::validate_config;

/// Project config file looked up under the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "pages.config.toml";
