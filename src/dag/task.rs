// src/dag/task.rs

//! Task values and the `series` / `parallel` combinators.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::errors::Result;

/// Future returned by running a task.
pub type TaskFuture = Pin<Box<dyn Future<Output = Result<()>> + Send + 'static>>;

/// The effect behind a leaf task. Called once per run.
pub type TaskEffect = Arc<dyn Fn() -> TaskFuture + Send + Sync>;

/// How the children of a composite are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKind {
    /// Strictly left to right; each child starts after the previous one
    /// completed successfully.
    Series,
    /// All children at once, no ordering between them.
    Parallel,
}

/// A named unit of work, or a composition of other tasks.
///
/// Tasks are cheap to clone and can be run any number of times; each call to
/// [`Task::run`] starts a fresh execution.
#[derive(Clone)]
pub enum Task {
    Leaf {
        name: String,
        effect: TaskEffect,
    },
    Composite {
        kind: CompositeKind,
        children: Vec<Task>,
    },
    /// Runs `inner`; a failure is logged and reported as success.
    Tolerant { inner: Box<Task> },
}

impl Task {
    /// Build a leaf task from an async closure.
    pub fn leaf<F, Fut>(name: impl Into<String>, effect: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        Task::Leaf {
            name: name.into(),
            effect: Arc::new(move || -> TaskFuture { Box::pin(effect()) }),
        }
    }

    /// Leaf name, or a bracketed marker for composites.
    pub fn name(&self) -> &str {
        match self {
            Task::Leaf { name, .. } => name,
            Task::Composite {
                kind: CompositeKind::Series,
                ..
            } => "<series>",
            Task::Composite {
                kind: CompositeKind::Parallel,
                ..
            } => "<parallel>",
            Task::Tolerant { .. } => "<tolerant>",
        }
    }

    /// Wrap this task so its failure does not fail the enclosing graph.
    pub fn tolerant(self) -> Task {
        Task::Tolerant {
            inner: Box::new(self),
        }
    }

    /// Start the task. See [`crate::dag::executor`] for the semantics.
    pub fn run(&self) -> TaskFuture {
        super::executor::run_task(self)
    }

    /// Leaf names in declaration order.
    pub fn leaf_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.collect_leaf_names(&mut names);
        names
    }

    fn collect_leaf_names<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Task::Leaf { name, .. } => out.push(name),
            Task::Composite { children, .. } => {
                for child in children {
                    child.collect_leaf_names(out);
                }
            }
            Task::Tolerant { inner } => inner.collect_leaf_names(out),
        }
    }

    /// Indented tree rendering, one node per line.
    pub fn describe(&self) -> String {
        let mut out = String::new();
        self.describe_into(&mut out, 0);
        out
    }

    fn describe_into(&self, out: &mut String, depth: usize) {
        out.push_str(&"  ".repeat(depth));
        out.push_str(self.name());
        out.push('\n');
        match self {
            Task::Leaf { .. } => {}
            Task::Composite { children, .. } => {
                for child in children {
                    child.describe_into(out, depth + 1);
                }
            }
            Task::Tolerant { inner } => inner.describe_into(out, depth + 1),
        }
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Task::Leaf { name, .. } => f.debug_struct("Leaf").field("name", name).finish_non_exhaustive(),
            Task::Composite { kind, children } => f
                .debug_struct("Composite")
                .field("kind", kind)
                .field("children", children)
                .finish(),
            Task::Tolerant { inner } => f.debug_struct("Tolerant").field("inner", inner).finish(),
        }
    }
}

/// Run `tasks` one after another.
pub fn series(tasks: impl IntoIterator<Item = Task>) -> Task {
    Task::Composite {
        kind: CompositeKind::Series,
        children: tasks.into_iter().collect(),
    }
}

/// Run `tasks` concurrently.
pub fn parallel(tasks: impl IntoIterator<Item = Task>) -> Task {
    Task::Composite {
        kind: CompositeKind::Parallel,
        children: tasks.into_iter().collect(),
    }
}
