// src/pipeline/glob.rs

//! Glob expansion against a base directory.

use std::path::{Path, PathBuf};

use globset::{GlobBuilder, GlobMatcher};

use crate::errors::{PipelineError, Result};
use crate::fs::FileSystem;

/// Compile a pattern with path-aware semantics: `*` stays inside one
/// segment, `**` crosses segments.
pub fn compile_glob(pattern: &str) -> Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .literal_separator(true)
        .build()
        .map_err(|e| PipelineError::Glob {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;
    Ok(glob.compile_matcher())
}

/// Relative path with forward slashes, as globs expect.
pub fn slash_path(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}

/// Expand `pattern` under `base` into matching file paths, relative to
/// `base`.
///
/// The walk is depth-first with each directory's entries sorted, so the
/// result order is stable for a given tree. A missing `base` yields no
/// matches.
pub fn expand(fs: &dyn FileSystem, base: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let matcher = compile_glob(pattern)?;

    let mut matches = Vec::new();
    if !fs.is_dir(base) {
        return Ok(matches);
    }

    walk(fs, base, base, &matcher, &mut matches)?;
    Ok(matches)
}

fn walk(
    fs: &dyn FileSystem,
    base: &Path,
    dir: &Path,
    matcher: &GlobMatcher,
    out: &mut Vec<PathBuf>,
) -> Result<()> {
    let mut children = fs.read_dir(dir)?;
    children.sort();

    for path in children {
        if fs.is_dir(&path) {
            walk(fs, base, &path, matcher, out)?;
        } else if fs.is_file(&path) {
            if let Ok(rel) = path.strip_prefix(base) {
                if matcher.is_match(slash_path(rel)) {
                    out.push(rel.to_path_buf());
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn site() -> MockFileSystem {
        let fs = MockFileSystem::new();
        fs.add_file("/p/src/index.html", "i");
        fs.add_file("/p/src/about.html", "a");
        fs.add_file("/p/src/partials/header.html", "h");
        fs.add_file("/p/src/assets/images/logo.png", "l");
        fs.add_file("/p/src/assets/images/icons/x.svg", "x");
        fs
    }

    #[test]
    fn single_star_does_not_cross_directories() {
        let files = expand(&site(), Path::new("/p/src"), "*.html").unwrap();
        assert_eq!(files, vec![PathBuf::from("about.html"), PathBuf::from("index.html")]);
    }

    #[test]
    fn double_star_crosses_directories() {
        let files = expand(&site(), Path::new("/p/src"), "assets/images/**").unwrap();
        assert_eq!(
            files,
            vec![
                PathBuf::from("assets/images/icons/x.svg"),
                PathBuf::from("assets/images/logo.png"),
            ]
        );
    }

    #[test]
    fn missing_base_matches_nothing() {
        assert!(expand(&site(), Path::new("/p/public"), "**").unwrap().is_empty());
    }

    #[test]
    fn invalid_pattern_is_a_glob_error() {
        assert!(matches!(
            expand(&site(), Path::new("/p/src"), "[*.html"),
            Err(PipelineError::Glob { .. })
        ));
    }
}
