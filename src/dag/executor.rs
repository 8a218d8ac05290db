// src/dag/executor.rs

//! The single interpreter for [`Task`] trees.
//!
//! - Leaves run their effect and log start, finish and failure.
//! - `Series` awaits each child before starting the next and stops at the
//!   first failure.
//! - `Parallel` spawns every child on the runtime. It returns as soon as one
//!   child fails; the remaining children are **not** cancelled, they are
//!   handed to a detached reaper that lets them finish and logs any further
//!   failures.

use std::collections::HashMap;
use std::time::Instant;

use tokio::task::{Id, JoinSet};
use tracing::{debug, error, info, warn};

use crate::dag::task::{CompositeKind, Task, TaskEffect, TaskFuture};
use crate::errors::{PipelineError, Result};

pub(crate) fn run_task(task: &Task) -> TaskFuture {
    match task {
        Task::Leaf { name, effect } => run_leaf(name.clone(), effect.clone()),
        Task::Composite {
            kind: CompositeKind::Series,
            children,
        } => run_series(children.clone()),
        Task::Composite {
            kind: CompositeKind::Parallel,
            children,
        } => run_parallel(children.clone()),
        Task::Tolerant { inner } => run_tolerant((**inner).clone()),
    }
}

fn run_leaf(name: String, effect: TaskEffect) -> TaskFuture {
    Box::pin(async move {
        info!(task = %name, "starting");
        let started = Instant::now();

        let result = effect().await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match &result {
            Ok(()) => info!(task = %name, elapsed_ms, "finished"),
            Err(err) => error!(task = %name, elapsed_ms, error = %err, "failed"),
        }
        result
    })
}

fn run_series(children: Vec<Task>) -> TaskFuture {
    Box::pin(async move {
        for child in children {
            child.run().await?;
        }
        Ok(())
    })
}

fn run_parallel(children: Vec<Task>) -> TaskFuture {
    Box::pin(async move {
        let mut set: JoinSet<Result<()>> = JoinSet::new();
        let mut names: HashMap<Id, String> = HashMap::new();

        for child in children {
            let name = child.name().to_string();
            let handle = set.spawn(child.run());
            names.insert(handle.id(), name);
        }

        while let Some(joined) = set.join_next_with_id().await {
            let result = match joined {
                Ok((_, result)) => result,
                Err(join_err) => Err(PipelineError::Join {
                    task: names.get(&join_err.id()).cloned().unwrap_or_default(),
                    message: join_err.to_string(),
                }),
            };

            if let Err(err) = result {
                if !set.is_empty() {
                    debug!(
                        remaining = set.len(),
                        "parallel branch failed; remaining branches keep running"
                    );
                    tokio::spawn(reap_detached(set, names));
                }
                return Err(err);
            }
        }

        Ok(())
    })
}

async fn reap_detached(mut set: JoinSet<Result<()>>, names: HashMap<Id, String>) {
    while let Some(joined) = set.join_next_with_id().await {
        match joined {
            Ok((_, Ok(()))) => {}
            Ok((id, Err(err))) => warn!(
                task = names.get(&id).map(String::as_str).unwrap_or("?"),
                error = %err,
                "sibling parallel branch also failed"
            ),
            Err(join_err) => warn!(
                task = names.get(&join_err.id()).map(String::as_str).unwrap_or("?"),
                error = %join_err,
                "sibling parallel branch panicked"
            ),
        }
    }
}

fn run_tolerant(inner: Task) -> TaskFuture {
    Box::pin(async move {
        if let Err(err) = inner.run().await {
            warn!(task = inner.name(), error = %err, "failure tolerated; continuing");
        }
        Ok(())
    })
}
