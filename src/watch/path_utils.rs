// src/watch/path_utils.rs

use std::path::Path;

use crate::pipeline::glob::slash_path;

/// `path` relative to `root`, `/`-separated, for pattern matching.
///
/// Tries a plain prefix strip first, then canonical forms of both paths
/// (symlinked temp dirs, `/private/var` on macOS). Removed files cannot be
/// canonicalised, so for those only the parent is. Returns `None` for paths
/// outside `root` and for `root` itself.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return non_empty(slash_path(rel));
    }

    let root_canon = root.canonicalize().ok()?;
    let path_canon = path.canonicalize().ok().or_else(|| {
        let parent = path.parent()?.canonicalize().ok()?;
        Some(parent.join(path.file_name()?))
    })?;

    path_canon
        .strip_prefix(&root_canon)
        .ok()
        .and_then(|rel| non_empty(slash_path(rel)))
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}
