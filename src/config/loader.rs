// src/config/loader.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::model::{BuildConfig, PartialConfig, RawBuildConfig};
use crate::config::validate::validate_config;
use crate::errors::{PipelineError, Result};
use crate::fs::FileSystem;

/// Where the optional project override comes from.
///
/// Injected at startup so configuration loading is a plain function of its
/// inputs: the CLI uses [`FileConfigSource`], tests use
/// [`StaticConfigSource`].
pub trait ConfigSource: Send + Sync {
    /// `Ok(None)` means "no override". Read failures are
    /// [`PipelineError::ConfigLoad`], malformed TOML is [`PipelineError::Toml`].
    fn load(&self) -> Result<Option<PartialConfig>>;

    /// Human-readable origin for log messages.
    fn describe(&self) -> String;
}

/// Reads a TOML override from a file. A missing file is not an error.
#[derive(Debug, Clone)]
pub struct FileConfigSource {
    fs: Arc<dyn FileSystem>,
    path: PathBuf,
}

impl FileConfigSource {
    pub fn new(fs: Arc<dyn FileSystem>, path: impl Into<PathBuf>) -> Self {
        Self {
            fs,
            path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigSource for FileConfigSource {
    fn load(&self) -> Result<Option<PartialConfig>> {
        if !self.fs.is_file(&self.path) {
            return Ok(None);
        }

        let contents = self
            .fs
            .read_to_string(&self.path)
            .map_err(|e| PipelineError::ConfigLoad(format!("{e:#}")))?;

        parse_partial(&contents).map(Some)
    }

    fn describe(&self) -> String {
        format!("{:?}", self.path)
    }
}

/// Fixed override, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct StaticConfigSource(pub Option<PartialConfig>);

impl ConfigSource for StaticConfigSource {
    fn load(&self) -> Result<Option<PartialConfig>> {
        Ok(self.0.clone())
    }

    fn describe(&self) -> String {
        "static override".to_string()
    }
}

/// Parse the TOML form of a [`PartialConfig`]. Unknown keys are logged and
/// skipped; every known key is still applied.
pub fn parse_partial(contents: &str) -> Result<PartialConfig> {
    let (partial, unknown) = parse_partial_reporting(contents)?;
    for key in unknown {
        warn!(%key, "unknown config key ignored");
    }
    Ok(partial)
}

/// [`parse_partial`], also returning the dotted paths of ignored keys.
pub fn parse_partial_reporting(contents: &str) -> Result<(PartialConfig, Vec<String>)> {
    let table: toml::Table = toml::from_str(contents)?;
    let mut unknown = Vec::new();
    let partial: PartialConfig = serde_ignored::deserialize(toml::Value::Table(table), |path| {
        unknown.push(path.to_string())
    })?;
    Ok((partial, unknown))
}

/// Build the process configuration: default, overlaid with whatever the
/// source provides, validated and resolved against `cwd`.
///
/// A source that cannot be read or parsed is logged and ignored; the default
/// is used unmodified. Validation failures of the merged result are returned.
pub fn load_config(source: &dyn ConfigSource, cwd: &Path) -> Result<BuildConfig> {
    let raw = match source.load() {
        Ok(Some(partial)) => {
            info!(source = %source.describe(), "applying project config override");
            RawBuildConfig::default().merge(partial)
        }
        Ok(None) => {
            debug!(source = %source.describe(), "no project config; using defaults");
            RawBuildConfig::default()
        }
        Err(err) => {
            warn!(
                source = %source.describe(),
                error = %err,
                "failed to load project config; using defaults"
            );
            RawBuildConfig::default()
        }
    };

    validate_config(raw, cwd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn missing_file_yields_defaults() {
        let fs = Arc::new(MockFileSystem::new());
        let source = FileConfigSource::new(fs, "/p/pages.config.toml");

        let cfg = load_config(&source, Path::new("/p")).unwrap();
        assert_eq!(cfg, BuildConfig::default_for(Path::new("/p")));
    }

    #[test]
    fn unparsable_file_is_tolerated() {
        let fs = MockFileSystem::new();
        fs.add_file("/p/pages.config.toml", "[build\nsrc = ");
        let source = FileConfigSource::new(Arc::new(fs), "/p/pages.config.toml");

        assert!(matches!(source.load(), Err(PipelineError::Toml(_))));
        let cfg = load_config(&source, Path::new("/p")).unwrap();
        assert_eq!(cfg.source_root, PathBuf::from("/p/src"));
    }

    #[test]
    fn file_override_is_applied() {
        let fs = MockFileSystem::new();
        fs.add_file(
            "/p/pages.config.toml",
            "[build]\nsrc = \"app\"\n\n[server]\nport = 3000\n",
        );
        let source = FileConfigSource::new(Arc::new(fs), "/p/pages.config.toml");

        let cfg = load_config(&source, Path::new("/p")).unwrap();
        assert_eq!(cfg.source_root, PathBuf::from("/p/app"));
        assert_eq!(cfg.server.port, 3000);
    }

    #[test]
    fn unknown_keys_are_reported_and_known_keys_kept() {
        let (partial, unknown) = parse_partial_reporting(
            "minify = true\n[build]\ndist = \"release\"\ncompress = 1\n[data]\ntitle = \"X\"\n",
        )
        .unwrap();

        assert_eq!(unknown.len(), 2, "{unknown:?}");
        assert!(unknown.iter().any(|k| k.contains("minify")));
        assert!(unknown.iter().any(|k| k.contains("compress")));

        let build = partial.build.unwrap();
        assert_eq!(build.dist.as_deref(), Some("release"));
        assert_eq!(
            partial.data.unwrap().get("title").and_then(|v| v.as_str()),
            Some("X")
        );
    }

    #[test]
    fn wrong_value_type_is_still_a_parse_error() {
        assert!(matches!(
            parse_partial("[server]\nport = \"eighty\"\n"),
            Err(PipelineError::Toml(_))
        ));
    }

    #[test]
    fn invalid_override_is_fatal() {
        let partial = parse_partial("[build]\ndist = \"\"\n").unwrap();
        let source = StaticConfigSource(Some(partial));

        assert!(matches!(
            load_config(&source, Path::new("/p")),
            Err(PipelineError::Config(_))
        ));
    }
}
