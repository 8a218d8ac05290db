// src/serve/hub.rs

use std::sync::{Mutex, MutexGuard};

use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::errors::{PipelineError, Result};
use crate::serve::{DevServer, ReloadOptions, ServeOptions};
use crate::types::ReloadKind;

/// Reload fan-out for connected client sessions.
///
/// Each client session holds a receiver from [`BroadcastDevServer::subscribe`].
/// Reloads sent while nobody is subscribed are dropped.
#[derive(Debug)]
pub struct BroadcastDevServer {
    reload_tx: broadcast::Sender<ReloadKind>,
    options: Mutex<Option<ServeOptions>>,
}

impl BroadcastDevServer {
    pub fn new() -> Self {
        let (reload_tx, _) = broadcast::channel(64);
        Self {
            reload_tx,
            options: Mutex::new(None),
        }
    }

    /// Attach a client session.
    pub fn subscribe(&self) -> broadcast::Receiver<ReloadKind> {
        self.reload_tx.subscribe()
    }

    /// Options from the last `init`, if any.
    pub fn serve_options(&self) -> Option<ServeOptions> {
        self.lock_options().clone()
    }

    fn lock_options(&self) -> MutexGuard<'_, Option<ServeOptions>> {
        self.options.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for BroadcastDevServer {
    fn default() -> Self {
        Self::new()
    }
}

impl DevServer for BroadcastDevServer {
    fn init(&self, options: ServeOptions) -> Result<()> {
        let mut slot = self.lock_options();
        if slot.is_some() {
            return Err(PipelineError::Config(
                "dev server already initialised".to_string(),
            ));
        }

        info!(
            port = options.port,
            base_dirs = ?options.base_dirs,
            routes = ?options.routes,
            "dev server ready"
        );
        *slot = Some(options);
        Ok(())
    }

    fn reload(&self, options: ReloadOptions) {
        let kind = options.kind();
        match self.reload_tx.send(kind) {
            Ok(clients) => debug!(?kind, clients, "reload sent"),
            Err(_) => debug!(?kind, "reload requested with no connected clients"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[tokio::test]
    async fn subscribed_sessions_receive_reloads() {
        let server = BroadcastDevServer::new();
        let mut a = server.subscribe();
        let mut b = server.subscribe();

        server.reload(ReloadOptions::stream());
        server.reload(ReloadOptions::full());

        assert_eq!(a.recv().await.unwrap(), ReloadKind::Stream);
        assert_eq!(a.recv().await.unwrap(), ReloadKind::Full);
        assert_eq!(b.recv().await.unwrap(), ReloadKind::Stream);
    }

    #[test]
    fn init_records_options_once() {
        let server = BroadcastDevServer::new();
        let options = ServeOptions {
            port: 2080,
            base_dirs: vec!["temp".into(), "src".into()],
            routes: BTreeMap::new(),
        };

        server.init(options.clone()).unwrap();
        assert_eq!(server.serve_options(), Some(options.clone()));
        assert!(server.init(options).is_err());
    }
}
