// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod orchestrator;
pub mod pipeline;
pub mod serve;
pub mod transforms;
pub mod types;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::config::{load_config, FileConfigSource};
use crate::errors::{PipelineError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::orchestrator::Project;
use crate::serve::BroadcastDevServer;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - working directory resolution
/// - config loading (file source, defaults on load failure)
/// - the project task graphs
/// - running the selected task, or printing the trees for `tasks`
pub async fn run(args: CliArgs) -> Result<()> {
    let cwd = resolve_cwd(args.cwd.as_deref())?;
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    let source = FileConfigSource::new(Arc::clone(&fs), cwd.join(&args.config));
    let config = load_config(&source, &cwd)?;
    debug!(?config, "configuration resolved");

    let project = Project::new(config, fs, Arc::new(BroadcastDevServer::new()));

    let name = match args.command {
        Command::Build => "build",
        Command::Start => "start",
        Command::Clean => "clean",
        Command::Tasks => {
            print_tasks(&project);
            return Ok(());
        }
    };

    let task = project
        .task(name)
        .ok_or_else(|| PipelineError::Config(format!("unknown task '{name}'")))?;

    info!(task = name, cwd = %cwd.display(), "running");
    task.run().await
}

/// `--cwd` if given, else the process working directory; canonicalised so
/// watcher events (which carry absolute paths) strip cleanly.
fn resolve_cwd(arg: Option<&Path>) -> Result<PathBuf> {
    let cwd = match arg {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir()?,
    };
    Ok(cwd.canonicalize().unwrap_or(cwd))
}

fn print_tasks(project: &Project) {
    for (name, task) in project.tasks() {
        println!("{name}:");
        for line in task.describe().lines() {
            println!("  {line}");
        }
    }
}
