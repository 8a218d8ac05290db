// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

use serde::Deserialize;

use crate::types::AssetCategory;

/// Project override as read from `pages.config.toml`.
///
/// Every field is optional; whatever is present replaces the matching
/// built-in default. Keys this struct does not know are ignored (the loader
/// warns about them):
///
/// ```toml
/// [build]
/// src = "app"
/// dist = "release"
///
/// [build.paths]
/// styles = "assets/styles/*.css"
///
/// [data]
/// title = "My site"
///
/// [server]
/// port = 3000
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PartialConfig {
    #[serde(default)]
    pub build: Option<PartialBuildSection>,

    /// Template data handed to page rendering. Replaces the default table
    /// wholesale when present.
    #[serde(default)]
    pub data: Option<toml::Table>,

    #[serde(default)]
    pub server: Option<PartialServerSection>,
}

/// `[build]` section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PartialBuildSection {
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub dist: Option<String>,
    #[serde(default)]
    pub temp: Option<String>,
    #[serde(default)]
    pub public: Option<String>,
    /// Keep the temp directory after a production build.
    #[serde(default)]
    pub keep_temp: Option<bool>,
    #[serde(default)]
    pub paths: Option<PartialPaths>,
}

/// `[build.paths]` section. Singular keys are accepted as aliases.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PartialPaths {
    #[serde(default, alias = "page")]
    pub pages: Option<String>,
    #[serde(default, alias = "script")]
    pub scripts: Option<String>,
    #[serde(default, alias = "style")]
    pub styles: Option<String>,
    #[serde(default, alias = "image")]
    pub images: Option<String>,
    #[serde(default, alias = "font")]
    pub fonts: Option<String>,
}

/// `[server]` section.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PartialServerSection {
    #[serde(default)]
    pub port: Option<u16>,
    /// URL prefix -> directory, consulted before the base directories.
    #[serde(default)]
    pub routes: Option<BTreeMap<String, String>>,
}

/// Per-category glob patterns, relative to the category's base directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPatterns {
    pub pages: String,
    pub scripts: String,
    pub styles: String,
    pub images: String,
    pub fonts: String,
}

impl PathPatterns {
    /// Pattern for a category. Public files are always taken whole.
    pub fn for_category(&self, category: AssetCategory) -> &str {
        match category {
            AssetCategory::Pages => &self.pages,
            AssetCategory::Scripts => &self.scripts,
            AssetCategory::Styles => &self.styles,
            AssetCategory::Images => &self.images,
            AssetCategory::Fonts => &self.fonts,
            AssetCategory::Public => "**",
        }
    }
}

impl Default for PathPatterns {
    fn default() -> Self {
        Self {
            pages: "*.html".to_string(),
            scripts: "assets/scripts/*.js".to_string(),
            styles: "assets/styles/*.scss".to_string(),
            images: "assets/images/**".to_string(),
            fonts: "assets/fonts/**".to_string(),
        }
    }
}

/// Dev server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerSettings {
    pub port: u16,
    pub routes: BTreeMap<String, String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        let mut routes = BTreeMap::new();
        routes.insert("/node_modules".to_string(), "node_modules".to_string());
        Self { port: 2080, routes }
    }
}

/// Fully populated but not yet validated or resolved configuration.
///
/// Root directories are still the strings the user wrote; they become
/// absolute in [`BuildConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct RawBuildConfig {
    pub src: String,
    pub dist: String,
    pub temp: String,
    pub public: String,
    pub paths: PathPatterns,
    pub data: toml::Table,
    pub server: ServerSettings,
    pub keep_temp: bool,
}

impl Default for RawBuildConfig {
    fn default() -> Self {
        Self {
            src: "src".to_string(),
            dist: "dist".to_string(),
            temp: "temp".to_string(),
            public: "public".to_string(),
            paths: PathPatterns::default(),
            data: toml::Table::new(),
            server: ServerSettings::default(),
            keep_temp: false,
        }
    }
}

impl RawBuildConfig {
    /// Overlay a partial config onto `self`. Every field present in
    /// `partial` wins; tables (`data`, `server.routes`) are replaced, not
    /// merged key by key.
    pub fn merge(mut self, partial: PartialConfig) -> Self {
        if let Some(build) = partial.build {
            overlay(&mut self.src, build.src);
            overlay(&mut self.dist, build.dist);
            overlay(&mut self.temp, build.temp);
            overlay(&mut self.public, build.public);
            overlay(&mut self.keep_temp, build.keep_temp);

            if let Some(paths) = build.paths {
                overlay(&mut self.paths.pages, paths.pages);
                overlay(&mut self.paths.scripts, paths.scripts);
                overlay(&mut self.paths.styles, paths.styles);
                overlay(&mut self.paths.images, paths.images);
                overlay(&mut self.paths.fonts, paths.fonts);
            }
        }

        overlay(&mut self.data, partial.data);

        if let Some(server) = partial.server {
            overlay(&mut self.server.port, server.port);
            overlay(&mut self.server.routes, server.routes);
        }

        self
    }
}

fn overlay<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

/// Validated configuration with every root resolved against the working
/// directory it was built for. Read-only for the rest of the process.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildConfig {
    /// Directory the configuration was resolved against. Also the second
    /// search root for bundled asset references.
    pub cwd: PathBuf,
    pub source_root: PathBuf,
    pub dist_root: PathBuf,
    pub temp_root: PathBuf,
    pub public_root: PathBuf,
    pub paths: PathPatterns,
    pub data: toml::Table,
    pub server: ServerSettings,
    pub keep_temp: bool,
}

impl BuildConfig {
    /// Construct without validation; use [`crate::config::validate_config`]
    /// or [`crate::config::load_config`] in application code.
    pub(crate) fn new_unchecked(raw: RawBuildConfig, cwd: &Path) -> Self {
        Self {
            cwd: cwd.to_path_buf(),
            source_root: resolve(cwd, &raw.src),
            dist_root: resolve(cwd, &raw.dist),
            temp_root: resolve(cwd, &raw.temp),
            public_root: resolve(cwd, &raw.public),
            paths: raw.paths,
            data: raw.data,
            server: raw.server,
            keep_temp: raw.keep_temp,
        }
    }

    /// Built-in defaults resolved against `cwd`.
    pub fn default_for(cwd: &Path) -> Self {
        Self::new_unchecked(RawBuildConfig::default(), cwd)
    }

    /// Directory a category is read from.
    pub fn base_dir(&self, category: AssetCategory) -> &Path {
        match category {
            AssetCategory::Public => &self.public_root,
            _ => &self.source_root,
        }
    }
}

/// `cwd.join(dir)` with `.` and `..` folded away lexically, so that
/// `"./src"`, `"src/"` and `"x/../src"` all name the same root.
fn resolve(cwd: &Path, dir: &str) -> PathBuf {
    let mut out = PathBuf::new();
    for component in cwd.join(dir).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}
