// src/pipeline/entry.rs

use std::fmt;
use std::path::{Component, Path, PathBuf};

/// One file flowing through a pipeline.
///
/// `relative_path` is relative to `base`; the write phase reproduces it under
/// the destination directory.
#[derive(Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub relative_path: PathBuf,
    pub contents: Vec<u8>,
    pub base: PathBuf,
}

impl FileEntry {
    pub fn new(base: impl Into<PathBuf>, relative_path: impl Into<PathBuf>, contents: Vec<u8>) -> Self {
        Self {
            relative_path: relative_path.into(),
            contents,
            base: base.into(),
        }
    }

    /// Where the entry was (or would have been) read from.
    pub fn source_path(&self) -> PathBuf {
        self.base.join(&self.relative_path)
    }

    /// Where the entry lands under `dest_dir`.
    pub fn dest_path(&self, dest_dir: &Path) -> PathBuf {
        dest_dir.join(&self.relative_path)
    }
}

/// True when `path` is a non-empty relative path that stays below the
/// directory it is joined onto.
pub fn is_contained(path: &Path) -> bool {
    let mut named = false;
    for component in path.components() {
        match component {
            Component::Normal(_) => named = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    named
}

impl fmt::Debug for FileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileEntry")
            .field("relative_path", &self.relative_path)
            .field("base", &self.base)
            .field("len", &self.contents.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn containment() {
        assert!(is_contained(Path::new("index.html")));
        assert!(is_contained(Path::new("./assets/main.js")));
        assert!(!is_contained(Path::new("")));
        assert!(!is_contained(Path::new(".")));
        assert!(!is_contained(Path::new("../escape.txt")));
        assert!(!is_contained(Path::new("assets/../../escape.txt")));
        assert!(!is_contained(Path::new("/etc/passwd")));
    }
}
