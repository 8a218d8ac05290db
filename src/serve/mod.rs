// src/serve/mod.rs

//! Dev server contract.
//!
//! The HTTP server and its browser client are external collaborators. The
//! build graph only needs two calls: start listening with a set of base
//! directories, and ask connected clients to reload. [`BroadcastDevServer`]
//! is the built-in implementation; it fans reload requests out to any
//! number of subscribed client sessions.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::PathBuf;

use crate::errors::Result;
use crate::types::ReloadKind;

pub mod hub;

pub use hub::BroadcastDevServer;

/// Options passed to [`DevServer::init`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeOptions {
    pub port: u16,
    /// Directories searched in order for a requested file.
    pub base_dirs: Vec<PathBuf>,
    /// URL prefix -> directory, consulted before `base_dirs`.
    pub routes: BTreeMap<String, PathBuf>,
}

/// Options passed to [`DevServer::reload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReloadOptions {
    /// `true`: swap changed assets in place. `false`: full page reload.
    pub stream: bool,
}

impl ReloadOptions {
    pub fn full() -> Self {
        Self { stream: false }
    }

    pub fn stream() -> Self {
        Self { stream: true }
    }

    pub fn kind(self) -> ReloadKind {
        if self.stream {
            ReloadKind::Stream
        } else {
            ReloadKind::Full
        }
    }
}

pub trait DevServer: Send + Sync + Debug {
    /// Start serving. Called once per development session.
    fn init(&self, options: ServeOptions) -> Result<()>;

    /// Ask connected clients to refresh. Never fails; with no clients it is
    /// a no-op.
    fn reload(&self, options: ReloadOptions);
}
