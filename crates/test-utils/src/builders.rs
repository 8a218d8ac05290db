#![allow(dead_code)]

use std::path::Path;

use pageflow::config::{validate_config, BuildConfig, RawBuildConfig};

/// Builder for `BuildConfig` to simplify test setup.
///
/// Starts from the built-in defaults; `build` validates and resolves against
/// the given working directory.
pub struct ConfigBuilder {
    raw: RawBuildConfig,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            raw: RawBuildConfig::default(),
        }
    }

    pub fn src(mut self, dir: &str) -> Self {
        self.raw.src = dir.to_string();
        self
    }

    pub fn dist(mut self, dir: &str) -> Self {
        self.raw.dist = dir.to_string();
        self
    }

    pub fn temp(mut self, dir: &str) -> Self {
        self.raw.temp = dir.to_string();
        self
    }

    pub fn public(mut self, dir: &str) -> Self {
        self.raw.public = dir.to_string();
        self
    }

    pub fn pages(mut self, pattern: &str) -> Self {
        self.raw.paths.pages = pattern.to_string();
        self
    }

    pub fn styles(mut self, pattern: &str) -> Self {
        self.raw.paths.styles = pattern.to_string();
        self
    }

    pub fn scripts(mut self, pattern: &str) -> Self {
        self.raw.paths.scripts = pattern.to_string();
        self
    }

    /// Template data from a TOML snippet, e.g. `title = "X"`.
    pub fn data(mut self, toml_src: &str) -> Self {
        self.raw.data = toml::from_str(toml_src).expect("test template data must be valid TOML");
        self
    }

    pub fn keep_temp(mut self, keep: bool) -> Self {
        self.raw.keep_temp = keep;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.raw.server.port = port;
        self
    }

    pub fn raw(self) -> RawBuildConfig {
        self.raw
    }

    pub fn build(self, cwd: &Path) -> BuildConfig {
        validate_config(self.raw, cwd).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
