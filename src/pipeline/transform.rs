// src/pipeline/transform.rs

//! The transform contract and the generic stages built on it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use regex::Regex;

/// What a transform did with one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransformOutput {
    /// Replacement contents, same path.
    Contents(Vec<u8>),
    /// Replacement contents under a new relative path.
    Renamed { path: PathBuf, contents: Vec<u8> },
    /// Remove the file from the stream.
    Drop,
    /// Replace the file with several files (relative paths), in order. Each
    /// continues through the rest of the chain.
    Split(Vec<(PathBuf, Vec<u8>)>),
}

/// A single pipeline step.
///
/// `path` is the entry's path relative to its base directory. Any error fails
/// the whole pipeline run; the pipeline only reports it, it never inspects it.
pub trait Transform: Send + Sync {
    fn name(&self) -> &str;
    fn apply(&self, contents: Vec<u8>, path: &Path) -> anyhow::Result<TransformOutput>;
}

impl fmt::Debug for dyn Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Transform({})", self.name())
    }
}

type TransformFn = dyn Fn(Vec<u8>, &Path) -> anyhow::Result<TransformOutput> + Send + Sync;

/// Adapts a closure to [`Transform`].
pub struct FnTransform {
    name: String,
    f: Box<TransformFn>,
}

impl FnTransform {
    pub fn new<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Vec<u8>, &Path) -> anyhow::Result<TransformOutput> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            f: Box::new(f),
        }
    }
}

impl Transform for FnTransform {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, contents: Vec<u8>, path: &Path) -> anyhow::Result<TransformOutput> {
        (self.f)(contents, path)
    }
}

/// Leaves contents untouched. Stands in for transforms whose real
/// implementation lives outside this crate (transpilers, compressors).
#[derive(Debug, Clone)]
pub struct Passthrough {
    name: String,
}

impl Passthrough {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Transform for Passthrough {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, contents: Vec<u8>, _path: &Path) -> anyhow::Result<TransformOutput> {
        Ok(TransformOutput::Contents(contents))
    }
}

/// Keeps contents, swaps the file extension `from` -> `to`.
#[derive(Debug, Clone)]
pub struct RenameExtension {
    name: String,
    from: String,
    to: String,
}

impl RenameExtension {
    pub fn new(name: impl Into<String>, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            from: from.into(),
            to: to.into(),
        }
    }
}

impl Transform for RenameExtension {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, contents: Vec<u8>, path: &Path) -> anyhow::Result<TransformOutput> {
        if path.extension().and_then(|e| e.to_str()) != Some(self.from.as_str()) {
            return Ok(TransformOutput::Contents(contents));
        }
        Ok(TransformOutput::Renamed {
            path: path.with_extension(&self.to),
            contents,
        })
    }
}

/// Predicate over an entry's relative path.
#[derive(Debug, Clone)]
pub enum PathGuard {
    /// File extension, without the dot, case-insensitive.
    Extension(String),
    /// Regex matched against the path with forward slashes.
    Pattern(Regex),
}

impl PathGuard {
    pub fn extension(ext: impl Into<String>) -> Self {
        PathGuard::Extension(ext.into())
    }

    pub fn matches(&self, path: &Path) -> bool {
        match self {
            PathGuard::Extension(ext) => path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(ext)),
            PathGuard::Pattern(re) => re.is_match(&path.to_string_lossy().replace('\\', "/")),
        }
    }
}

/// One stage with mutually exclusive branches.
///
/// The first branch whose guard matches the entry's path runs; entries that
/// match no guard pass through unchanged.
#[derive(Debug, Default)]
pub struct Conditional {
    branches: Vec<(PathGuard, Arc<dyn Transform>)>,
}

impl Conditional {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn when(mut self, guard: PathGuard, transform: impl Transform + 'static) -> Self {
        self.branches.push((guard, Arc::new(transform)));
        self
    }
}

impl Transform for Conditional {
    fn name(&self) -> &str {
        "if"
    }

    fn apply(&self, contents: Vec<u8>, path: &Path) -> anyhow::Result<TransformOutput> {
        match self.branches.iter().find(|(guard, _)| guard.matches(path)) {
            Some((_, transform)) => transform.apply(contents, path),
            None => Ok(TransformOutput::Contents(contents)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conditional_picks_first_matching_branch_and_passes_others() {
        let stage = Conditional::new()
            .when(
                PathGuard::extension("js"),
                FnTransform::new("upper", |c, _| {
                    Ok(TransformOutput::Contents(c.to_ascii_uppercase()))
                }),
            )
            .when(
                PathGuard::Pattern(Regex::new(r"\.js$").unwrap()),
                FnTransform::new("never", |_, _| Ok(TransformOutput::Drop)),
            );

        let js = stage.apply(b"let a".to_vec(), Path::new("a/app.JS")).unwrap();
        assert_eq!(js, TransformOutput::Contents(b"LET A".to_vec()));

        let css = stage.apply(b"a{}".to_vec(), Path::new("a/app.css")).unwrap();
        assert_eq!(css, TransformOutput::Contents(b"a{}".to_vec()));
    }

    #[test]
    fn rename_extension_only_touches_matching_files() {
        let stage = RenameExtension::new("sass", "scss", "css");

        let out = stage.apply(b"a{}".to_vec(), Path::new("styles/main.scss")).unwrap();
        assert_eq!(
            out,
            TransformOutput::Renamed {
                path: PathBuf::from("styles/main.css"),
                contents: b"a{}".to_vec()
            }
        );

        let out = stage.apply(b"a{}".to_vec(), Path::new("styles/plain.css")).unwrap();
        assert_eq!(out, TransformOutput::Contents(b"a{}".to_vec()));
    }
}
