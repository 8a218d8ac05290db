// src/watch/patterns.rs

use std::fmt;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::errors::{PipelineError, Result};

/// Compiled include/exclude globs for one binding.
///
/// Patterns are relative to the binding's `cwd` and use `/` separators. A
/// leading `!` turns a pattern into an exclusion:
///
/// ```text
/// ["assets/images/**", "assets/fonts/**", "!**/*.tmp"]
/// ```
#[derive(Clone)]
pub struct PatternSet {
    sources: Vec<String>,
    include: GlobSet,
    exclude: Option<GlobSet>,
}

impl fmt::Debug for PatternSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatternSet")
            .field("sources", &self.sources)
            .finish_non_exhaustive()
    }
}

impl PatternSet {
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let mut include = GlobSetBuilder::new();
        let mut exclude = GlobSetBuilder::new();
        let mut includes = 0usize;
        let mut excludes = 0usize;

        for raw in patterns {
            let raw = raw.as_ref().trim();
            if raw.is_empty() {
                continue;
            }
            match raw.strip_prefix('!') {
                Some(negated) => {
                    exclude.add(glob(negated)?);
                    excludes += 1;
                }
                None => {
                    include.add(glob(raw)?);
                    includes += 1;
                }
            }
        }

        if includes == 0 {
            return Err(PipelineError::Config(
                "watch binding needs at least one non-negated pattern".to_string(),
            ));
        }

        let include = include.build().map_err(|e| glob_error(patterns, e))?;
        let exclude = if excludes > 0 {
            Some(exclude.build().map_err(|e| glob_error(patterns, e))?)
        } else {
            None
        };

        Ok(Self {
            sources: patterns.iter().map(|p| p.as_ref().to_string()).collect(),
            include,
            exclude,
        })
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// `rel_path` is relative to the binding root, `/`-separated.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include.is_match(rel_path) {
            return false;
        }
        !self.exclude.as_ref().is_some_and(|ex| ex.is_match(rel_path))
    }
}

fn glob(pattern: &str) -> Result<globset::Glob> {
    GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| PipelineError::Glob {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}

fn glob_error<S: AsRef<str>>(patterns: &[S], err: globset::Error) -> PipelineError {
    PipelineError::Glob {
        pattern: patterns.iter().map(|p| p.as_ref()).collect::<Vec<_>>().join(", "),
        message: err.to_string(),
    }
}
