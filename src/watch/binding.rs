// src/watch/binding.rs

use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::dag::Task;
use crate::engine::{BindingId, FlightTable};
use crate::errors::Result;
use crate::watch::patterns::PatternSet;

/// How a binding observes the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchOptions {
    /// Root the patterns are relative to. Also the directory subscribed to.
    pub cwd: PathBuf,
    /// Skip events whose file content is unchanged since the last trigger.
    pub use_hash: bool,
}

impl WatchOptions {
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self {
            cwd: cwd.into(),
            use_hash: false,
        }
    }

    pub fn use_hash(mut self, enabled: bool) -> Self {
        self.use_hash = enabled;
        self
    }
}

/// A pattern set tied to the task it triggers.
#[derive(Debug, Clone)]
pub struct WatchBinding {
    id: BindingId,
    name: String,
    patterns: PatternSet,
    options: WatchOptions,
    task: Task,
}

impl WatchBinding {
    pub fn id(&self) -> BindingId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn patterns(&self) -> &PatternSet {
        &self.patterns
    }

    pub fn options(&self) -> &WatchOptions {
        &self.options
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        self.patterns.matches(rel_path)
    }
}

/// All bindings of a development session, addressed by [`BindingId`].
#[derive(Debug, Default)]
pub struct BindingRegistry {
    bindings: Vec<WatchBinding>,
}

impl BindingRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `task` to run whenever a path under `options.cwd` matching
    /// `patterns` changes.
    pub fn bind_watch<S: AsRef<str>>(
        &mut self,
        name: impl Into<String>,
        patterns: &[S],
        options: WatchOptions,
        task: Task,
    ) -> Result<BindingId> {
        let patterns = PatternSet::compile(patterns)?;
        let id = BindingId(self.bindings.len());
        self.bindings.push(WatchBinding {
            id,
            name: name.into(),
            patterns,
            options,
            task,
        });
        Ok(id)
    }

    pub fn get(&self, id: BindingId) -> Option<&WatchBinding> {
        self.bindings.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WatchBinding> {
        self.bindings.iter()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Distinct binding roots, sorted.
    pub fn roots(&self) -> Vec<PathBuf> {
        self.bindings
            .iter()
            .map(|b| b.options.cwd.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Fresh single-flight table covering every binding.
    pub fn flight_table(&self) -> FlightTable {
        FlightTable::new(self.bindings.iter().map(|b| (b.id, b.name.clone())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &str) -> Task {
        Task::leaf(name, || async { Ok(()) })
    }

    #[test]
    fn ids_are_assigned_in_registration_order() {
        let mut reg = BindingRegistry::new();
        let a = reg
            .bind_watch("pages", &["*.html"], WatchOptions::new("/p/src"), noop("page"))
            .unwrap();
        let b = reg
            .bind_watch("extra", &["**"], WatchOptions::new("/p/public"), noop("extra"))
            .unwrap();
        let c = reg
            .bind_watch("styles", &["assets/styles/*.scss"], WatchOptions::new("/p/src"), noop("style"))
            .unwrap();

        assert_eq!((a, b, c), (BindingId(0), BindingId(1), BindingId(2)));
        assert_eq!(reg.get(b).unwrap().name(), "extra");
        assert_eq!(reg.roots(), vec![PathBuf::from("/p/public"), PathBuf::from("/p/src")]);
        assert_eq!(reg.flight_table().name(c), Some("styles"));
    }

    #[test]
    fn invalid_patterns_reject_the_binding() {
        let mut reg = BindingRegistry::new();
        assert!(reg
            .bind_watch("bad", &["a/[b"], WatchOptions::new("/p"), noop("bad"))
            .is_err());
        assert!(reg.is_empty());
    }
}
