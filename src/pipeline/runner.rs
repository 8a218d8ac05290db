// src/pipeline/runner.rs

//! Turning a [`PipelineSpec`] into a runnable [`Task`].

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::dag::Task;
use crate::errors::{PipelineError, Result};
use crate::fs::FileSystem;
use crate::pipeline::entry::{is_contained, FileEntry};
use crate::pipeline::glob::expand;
use crate::pipeline::transform::{Transform, TransformOutput};
use crate::serve::{DevServer, ReloadOptions};

/// Everything one pipeline run needs: what to read, how to transform it,
/// where to write it, and whether to signal a reload afterwards.
#[derive(Clone)]
pub struct PipelineSpec {
    pub name: String,
    pub pattern: String,
    pub base_dir: PathBuf,
    pub transforms: Vec<Arc<dyn Transform>>,
    pub dest_dir: PathBuf,
    pub reload: Option<(Arc<dyn DevServer>, ReloadOptions)>,
}

impl PipelineSpec {
    pub fn new(
        name: impl Into<String>,
        pattern: impl Into<String>,
        base_dir: impl Into<PathBuf>,
        dest_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
            base_dir: base_dir.into(),
            transforms: Vec::new(),
            dest_dir: dest_dir.into(),
            reload: None,
        }
    }

    pub fn pipe(mut self, transform: impl Transform + 'static) -> Self {
        self.transforms.push(Arc::new(transform));
        self
    }

    pub fn pipe_shared(mut self, transform: Arc<dyn Transform>) -> Self {
        self.transforms.push(transform);
        self
    }

    /// Emit one reload per run once all files are written.
    pub fn reload(mut self, server: Arc<dyn DevServer>, options: ReloadOptions) -> Self {
        self.reload = Some((server, options));
        self
    }
}

impl fmt::Debug for PipelineSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let transforms: Vec<&str> = self.transforms.iter().map(|t| t.name()).collect();
        f.debug_struct("PipelineSpec")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .field("base_dir", &self.base_dir)
            .field("transforms", &transforms)
            .field("dest_dir", &self.dest_dir)
            .field("reload", &self.reload.as_ref().map(|(_, o)| *o))
            .finish()
    }
}

/// Outcome of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Files matched by the glob.
    pub matched: usize,
    /// Destination paths written, in write order.
    pub written: Vec<PathBuf>,
    pub reloaded: bool,
}

/// Wrap a pipeline in a leaf task named after it.
pub fn run_pipeline(spec: PipelineSpec, fs: Arc<dyn FileSystem>) -> Task {
    let spec = Arc::new(spec);
    Task::leaf(spec.name.clone(), move || {
        let spec = Arc::clone(&spec);
        let fs = Arc::clone(&fs);
        async move { execute(spec, fs).await.map(|_| ()) }
    })
}

/// Run a pipeline once.
///
/// File work happens on the blocking pool; the reload, if configured, is
/// issued after every write of this run has completed.
pub async fn execute(spec: Arc<PipelineSpec>, fs: Arc<dyn FileSystem>) -> Result<PipelineReport> {
    let blocking_spec = Arc::clone(&spec);
    let mut report = tokio::task::spawn_blocking(move || process(&blocking_spec, fs.as_ref()))
        .await
        .map_err(|e| PipelineError::Join {
            task: spec.name.clone(),
            message: e.to_string(),
        })??;

    if let Some((server, options)) = &spec.reload {
        if !report.written.is_empty() {
            server.reload(*options);
            report.reloaded = true;
        }
    }

    debug!(
        pipeline = %spec.name,
        matched = report.matched,
        written = report.written.len(),
        reloaded = report.reloaded,
        "pipeline run complete"
    );
    Ok(report)
}

/// Expand, transform and write, synchronously.
pub fn process(spec: &PipelineSpec, fs: &dyn FileSystem) -> Result<PipelineReport> {
    let matched = expand(fs, &spec.base_dir, &spec.pattern)?;

    let mut report = PipelineReport {
        matched: matched.len(),
        ..PipelineReport::default()
    };

    for rel in matched {
        let source = spec.base_dir.join(&rel);
        let contents = fs.read(&source)?;
        let entry = FileEntry::new(&spec.base_dir, rel, contents);

        for out in apply_chain(&spec.transforms, entry)? {
            let dest = out.dest_path(&spec.dest_dir);
            fs.write(&dest, &out.contents)?;
            report.written.push(dest);
        }
    }

    Ok(report)
}

/// Thread one entry through every transform, keeping the order of any
/// entries a transform splits it into.
pub fn apply_chain(transforms: &[Arc<dyn Transform>], entry: FileEntry) -> Result<Vec<FileEntry>> {
    let mut current = vec![entry];

    for transform in transforms {
        let mut next = Vec::with_capacity(current.len());
        for entry in current {
            apply_one(transform.as_ref(), entry, &mut next)?;
        }
        current = next;
    }

    Ok(current)
}

fn apply_one(transform: &dyn Transform, entry: FileEntry, out: &mut Vec<FileEntry>) -> Result<()> {
    let FileEntry {
        relative_path,
        contents,
        base,
    } = entry;

    let output = transform
        .apply(contents, &relative_path)
        .map_err(|e| PipelineError::transform(transform.name(), base.join(&relative_path), format!("{e:#}")))?;

    let escapes = |path: &Path| {
        PipelineError::transform(
            transform.name(),
            base.join(&relative_path),
            format!("output path {} escapes the destination directory", path.display()),
        )
    };

    match output {
        TransformOutput::Contents(contents) => out.push(FileEntry::new(base, relative_path, contents)),
        TransformOutput::Renamed { path, contents } => {
            if !is_contained(&path) {
                return Err(escapes(&path));
            }
            out.push(FileEntry::new(base, path, contents));
        }
        TransformOutput::Drop => {
            debug!(transform = transform.name(), path = ?relative_path, "entry dropped");
        }
        TransformOutput::Split(parts) => {
            if let Some((path, _)) = parts.iter().find(|(path, _)| !is_contained(path)) {
                return Err(escapes(path));
            }
            for (path, contents) in parts {
                out.push(FileEntry::new(base.as_path(), path, contents));
            }
        }
    }

    Ok(())
}
