// src/watch/hash.rs

//! Content-hash filter for `use_hash` bindings.
//!
//! Editors often touch or rewrite a file without changing it. For bindings
//! that opt in, an event only triggers when the file's `blake3` hash differs
//! from the one recorded at that binding's previous trigger for the same path.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use blake3::Hash;
use tracing::debug;

use crate::engine::BindingId;
use crate::fs::FileSystem;

/// Hash a file's current contents. `None` if it cannot be read (removed,
/// or a directory).
pub fn content_hash(fs: &dyn FileSystem, path: &Path) -> Option<Hash> {
    if !fs.is_file(path) {
        return None;
    }
    fs.read(path).ok().map(|bytes| blake3::hash(&bytes))
}

#[derive(Debug)]
pub struct ContentFilter {
    fs: Arc<dyn FileSystem>,
    seen: HashMap<(BindingId, PathBuf), Hash>,
}

impl ContentFilter {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            seen: HashMap::new(),
        }
    }

    /// Record the file's current hash for `binding` and report whether it
    /// changed. Unreadable files always count as changed and are forgotten.
    pub fn should_trigger(&mut self, binding: BindingId, path: &Path) -> bool {
        let key = (binding, path.to_path_buf());
        match content_hash(self.fs.as_ref(), path) {
            None => {
                self.seen.remove(&key);
                true
            }
            Some(hash) => {
                let previous = self.seen.insert(key, hash);
                if previous == Some(hash) {
                    debug!(%binding, ?path, "content unchanged; event dropped");
                    false
                } else {
                    true
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MockFileSystem;

    #[test]
    fn identical_content_is_filtered_per_binding() {
        let fs = MockFileSystem::new();
        fs.add_file("/p/a.css", "a{}");
        let mut filter = ContentFilter::new(Arc::new(fs.clone()));
        let path = Path::new("/p/a.css");

        assert!(filter.should_trigger(BindingId(0), path));
        assert!(!filter.should_trigger(BindingId(0), path));
        // Another binding has its own history.
        assert!(filter.should_trigger(BindingId(1), path));

        fs.add_file("/p/a.css", "b{}");
        assert!(filter.should_trigger(BindingId(0), path));
    }

    #[test]
    fn removed_files_always_trigger() {
        let fs = MockFileSystem::new();
        let mut filter = ContentFilter::new(Arc::new(fs));
        assert!(filter.should_trigger(BindingId(0), Path::new("/p/gone.css")));
        assert!(filter.should_trigger(BindingId(0), Path::new("/p/gone.css")));
    }
}
