// src/orchestrator/project.rs

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::BuildConfig;
use crate::dag::{parallel, series, Task};
use crate::errors::PipelineError;
use crate::fs::FileSystem;
use crate::orchestrator::dev::DevSession;
use crate::orchestrator::toolchain::Toolchain;
use crate::pipeline::{run_pipeline, Conditional, PathGuard, PipelineSpec};
use crate::serve::{DevServer, ReloadOptions};
use crate::transforms::{MinifyCss, MinifyHtml, MinifyJs, Useref};
use crate::types::AssetCategory;

/// Assembles the top-level task graphs for one project.
///
/// ```text
/// clean = remove(temp, dist)
/// build = series(clean, parallel(series(compile, bundle[, clean-temp]), image, font, extra))
/// start = series(tolerant(compile), serve)
/// compile = parallel(page, script, style)
/// ```
#[derive(Debug, Clone)]
pub struct Project {
    config: Arc<BuildConfig>,
    fs: Arc<dyn FileSystem>,
    toolchain: Toolchain,
    server: Arc<dyn DevServer>,
}

impl Project {
    /// Project using the built-in toolchain.
    pub fn new(config: BuildConfig, fs: Arc<dyn FileSystem>, server: Arc<dyn DevServer>) -> Self {
        let toolchain = Toolchain::builtin(&config.data);
        Self {
            config: Arc::new(config),
            fs,
            toolchain,
            server,
        }
    }

    pub fn with_toolchain(mut self, toolchain: Toolchain) -> Self {
        self.toolchain = toolchain;
        self
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub fn server(&self) -> &Arc<dyn DevServer> {
        &self.server
    }

    /// Pipeline for one asset category.
    ///
    /// Pages, scripts and styles compile into the temp tree and stream-reload;
    /// images, fonts and public files go straight to dist.
    pub fn category_spec(&self, category: AssetCategory) -> PipelineSpec {
        let dest = if category.compiled_in_development() {
            &self.config.temp_root
        } else {
            &self.config.dist_root
        };

        let mut spec = PipelineSpec::new(
            category.task_name(),
            self.config.paths.for_category(category),
            self.config.base_dir(category),
            dest,
        );
        for transform in self.toolchain.chain(category) {
            spec = spec.pipe_shared(Arc::clone(transform));
        }
        if category.compiled_in_development() {
            spec = spec.reload(Arc::clone(&self.server), ReloadOptions::stream());
        }
        spec
    }

    pub fn category_task(&self, category: AssetCategory) -> Task {
        run_pipeline(self.category_spec(category), Arc::clone(&self.fs))
    }

    pub fn compile(&self) -> Task {
        parallel([
            self.category_task(AssetCategory::Pages),
            self.category_task(AssetCategory::Scripts),
            self.category_task(AssetCategory::Styles),
        ])
    }

    /// Build-comment bundling over the compiled pages, then minification by
    /// file type, into dist.
    pub fn bundle_spec(&self) -> PipelineSpec {
        let config = &self.config;
        let useref = Useref::new(
            Arc::clone(&self.fs),
            vec![config.temp_root.clone(), config.cwd.clone()],
        );
        let minify = Conditional::new()
            .when(PathGuard::extension("js"), MinifyJs)
            .when(PathGuard::extension("css"), MinifyCss)
            .when(PathGuard::extension("html"), MinifyHtml);

        PipelineSpec::new("useref", &config.paths.pages, &config.temp_root, &config.dist_root)
            .pipe(useref)
            .pipe(minify)
    }

    pub fn bundle(&self) -> Task {
        run_pipeline(self.bundle_spec(), Arc::clone(&self.fs))
    }

    pub fn clean(&self) -> Task {
        remove_dirs(
            "clean",
            Arc::clone(&self.fs),
            vec![self.config.temp_root.clone(), self.config.dist_root.clone()],
        )
    }

    pub fn clean_temp(&self) -> Task {
        remove_dirs(
            "clean-temp",
            Arc::clone(&self.fs),
            vec![self.config.temp_root.clone()],
        )
    }

    pub fn build(&self) -> Task {
        let mut chain = vec![self.compile(), self.bundle()];
        if !self.config.keep_temp {
            chain.push(self.clean_temp());
        }

        series([
            self.clean(),
            parallel([
                series(chain),
                self.category_task(AssetCategory::Images),
                self.category_task(AssetCategory::Fonts),
                self.category_task(AssetCategory::Public),
            ]),
        ])
    }

    /// Start the dev server and watch until Ctrl-C.
    pub fn serve(&self) -> Task {
        let project = self.clone();
        Task::leaf("serve", move || {
            let session = DevSession::new(project.clone());
            async move { session.run(ctrl_c()).await }
        })
    }

    pub fn start(&self) -> Task {
        series([self.compile().tolerant(), self.serve()])
    }

    /// The published tasks, by name.
    pub fn tasks(&self) -> Vec<(&'static str, Task)> {
        vec![
            ("build", self.build()),
            ("start", self.start()),
            ("clean", self.clean()),
        ]
    }

    pub fn task(&self, name: &str) -> Option<Task> {
        match name {
            "build" => Some(self.build()),
            "start" => Some(self.start()),
            "clean" => Some(self.clean()),
            _ => None,
        }
    }
}

fn remove_dirs(name: &'static str, fs: Arc<dyn FileSystem>, dirs: Vec<PathBuf>) -> Task {
    Task::leaf(name, move || {
        let fs = Arc::clone(&fs);
        let dirs = dirs.clone();
        async move {
            tokio::task::spawn_blocking(move || {
                for dir in &dirs {
                    fs.remove_dir_all(dir).map_err(|e| PipelineError::Deletion {
                        path: dir.clone(),
                        message: format!("{e:#}"),
                    })?;
                    debug!(?dir, "removed");
                }
                Ok::<(), PipelineError>(())
            })
            .await
            .map_err(|e| PipelineError::Join {
                task: name.to_string(),
                message: e.to_string(),
            })?
        }
    })
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Ctrl-C received; shutting down"),
        Err(err) => {
            warn!("cannot listen for Ctrl-C ({err}); serving until killed");
            std::future::pending::<()>().await;
        }
    }
}
