// src/orchestrator/dev.rs

//! Development session: dev server plus watch bindings.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::info;

use crate::dag::Task;
use crate::engine::{Coordinator, CoordinatorEvent, CoreCoordinator};
use crate::errors::Result;
use crate::exec::TaskBindingExecutor;
use crate::orchestrator::project::Project;
use crate::serve::{DevServer, ReloadOptions, ServeOptions};
use crate::types::AssetCategory;
use crate::watch::{spawn_watcher, BindingRegistry, WatchOptions};

const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct DevSession {
    project: Project,
}

impl DevSession {
    pub fn new(project: Project) -> Self {
        Self { project }
    }

    /// Temp first so compiled output shadows sources, then sources, then
    /// public files.
    pub fn serve_options(&self) -> ServeOptions {
        let config = self.project.config();
        ServeOptions {
            port: config.server.port,
            base_dirs: vec![
                config.temp_root.clone(),
                config.source_root.clone(),
                config.public_root.clone(),
            ],
            routes: config
                .server
                .routes
                .iter()
                .map(|(prefix, dir)| (prefix.clone(), config.cwd.join(dir)))
                .collect(),
        }
    }

    /// Pages, scripts and styles rerun their pipeline (which stream-reloads)
    /// and skip saves that leave the content unchanged. Images, fonts and
    /// public files only trigger a full reload.
    pub fn bindings(&self) -> Result<BindingRegistry> {
        let config = self.project.config();
        let mut registry = BindingRegistry::new();

        for category in [AssetCategory::Pages, AssetCategory::Scripts, AssetCategory::Styles] {
            registry.bind_watch(
                category.to_string(),
                &[config.paths.for_category(category)],
                WatchOptions::new(&config.source_root).use_hash(true),
                self.project.category_task(category),
            )?;
        }

        let reload = reload_task(Arc::clone(self.project.server()));
        registry.bind_watch(
            "assets",
            &[config.paths.images.as_str(), config.paths.fonts.as_str()],
            WatchOptions::new(&config.source_root),
            reload.clone(),
        )?;
        registry.bind_watch(
            AssetCategory::Public.to_string(),
            &[config.paths.for_category(AssetCategory::Public)],
            WatchOptions::new(&config.public_root),
            reload,
        )?;

        Ok(registry)
    }

    /// Start the server, watch, and coordinate until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.project.server().init(self.serve_options())?;

        let registry = Arc::new(self.bindings()?);
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);

        let watcher = spawn_watcher(Arc::clone(&registry), Arc::clone(self.project.fs()), tx.clone())?;
        info!(roots = ?watcher.roots(), bindings = registry.len(), "watching for changes");

        let shutdown_tx = tx.clone();
        tokio::spawn(async move {
            shutdown.await;
            let _ = shutdown_tx.send(CoordinatorEvent::ShutdownRequested).await;
        });

        let core = CoreCoordinator::new(registry.flight_table());
        let executor = TaskBindingExecutor::new(registry, tx);
        let result = Coordinator::new(core, rx, executor).run().await;

        drop(watcher);
        result
    }
}

fn reload_task(server: Arc<dyn DevServer>) -> Task {
    Task::leaf("reload", move || {
        let server = Arc::clone(&server);
        async move {
            server.reload(ReloadOptions::full());
            Ok(())
        }
    })
}
