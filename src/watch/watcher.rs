// src/watch/watcher.rs

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::engine::CoordinatorEvent;
use crate::fs::FileSystem;
use crate::watch::binding::BindingRegistry;
use crate::watch::event_handler::route_event;
use crate::watch::hash::ContentFilter;

/// Keeps the OS watcher alive. Dropping it stops file watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
    roots: Vec<PathBuf>,
}

impl WatcherHandle {
    /// Roots actually subscribed to.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("roots", &self.roots)
            .finish_non_exhaustive()
    }
}

/// Subscribe to every distinct binding root and forward matching changes to
/// the coordinator as `BindingTriggered` events.
///
/// Roots that do not exist yet are skipped with a warning.
pub fn spawn_watcher(
    registry: Arc<BindingRegistry>,
    fs: Arc<dyn FileSystem>,
    coordinator_tx: mpsc::Sender<CoordinatorEvent>,
) -> Result<WatcherHandle> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                if event_tx.send(event).is_err() {
                    debug!("watch event loop gone; dropping notify event");
                }
            }
            Err(err) => warn!("file watch error: {err}"),
        },
        Config::default(),
    )?;

    let mut roots = Vec::new();
    for root in registry.roots() {
        if !fs.is_dir(&root) {
            warn!(?root, "watch root does not exist; skipping");
            continue;
        }
        watcher.watch(&root, RecursiveMode::Recursive)?;
        info!(?root, "watching");
        roots.push(root);
    }

    let mut filter = ContentFilter::new(Arc::clone(&fs));

    tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            debug!(?event, "received notify event");
            for binding in route_event(&registry, &mut filter, &event) {
                if coordinator_tx
                    .send(CoordinatorEvent::BindingTriggered { binding })
                    .await
                    .is_err()
                {
                    debug!("coordinator closed; watcher event loop stopping");
                    return;
                }
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle {
        _inner: watcher,
        roots,
    })
}
