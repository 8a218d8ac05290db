// src/transforms/useref.rs

//! Build-comment bundling.
//!
//! A page may group asset references between markers:
//!
//! ```html
//! <!-- build:js assets/scripts/app.js -->
//! <script src="/assets/scripts/a.js"></script>
//! <script src="/assets/scripts/b.js"></script>
//! <!-- endbuild -->
//! ```
//!
//! The block is replaced by a single reference to the target path and the
//! referenced files are concatenated into that target. `build:css` works the
//! same way with `<link href>`; `build:remove` drops the block. References are
//! looked up in each search path in order; the first hit wins.

use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock};

use anyhow::{bail, Context, Result};
use regex::Regex;
use tracing::debug;

use crate::fs::FileSystem;
use crate::pipeline::{is_contained, Transform, TransformOutput};

static BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--\s*build:(\w+)(?:\s+([^\s>]+))?\s*-->(.*?)<!--\s*endbuild\s*-->")
        .expect("build block regex is valid")
});
static SCRIPT_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<script\b[^>]*\bsrc\s*=\s*["']([^"']+)["']"#).expect("script regex is valid")
});
static LINK_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<link\b[^>]*\bhref\s*=\s*["']([^"']+)["']"#).expect("link regex is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Js,
    Css,
    Remove,
}

impl BlockKind {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "js" => Some(BlockKind::Js),
            "css" => Some(BlockKind::Css),
            "remove" => Some(BlockKind::Remove),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Useref {
    fs: Arc<dyn FileSystem>,
    search_paths: Vec<PathBuf>,
}

impl Useref {
    pub fn new(fs: Arc<dyn FileSystem>, search_paths: Vec<PathBuf>) -> Self {
        Self { fs, search_paths }
    }

    fn resolve(&self, page: &Path, reference: &str) -> Result<PathBuf> {
        let reference = reference.split(['?', '#']).next().unwrap_or(reference);
        let mut candidates = Vec::new();

        match reference.strip_prefix('/') {
            Some(rooted) => {
                for root in &self.search_paths {
                    candidates.push(root.join(rooted));
                }
            }
            None => {
                let page_dir = page.parent().unwrap_or(Path::new(""));
                for root in &self.search_paths {
                    candidates.push(root.join(page_dir).join(reference));
                    candidates.push(root.join(reference));
                }
            }
        }

        match candidates.into_iter().find(|c| self.fs.is_file(c)) {
            Some(found) => Ok(found),
            None => bail!(
                "reference '{reference}' not found in search paths {:?}",
                self.search_paths
            ),
        }
    }

    fn bundle(&self, page: &Path, kind: BlockKind, body: &str) -> Result<Vec<u8>> {
        let refs = match kind {
            BlockKind::Js => &*SCRIPT_SRC,
            BlockKind::Css => &*LINK_HREF,
            BlockKind::Remove => return Ok(Vec::new()),
        };

        let mut parts = Vec::new();
        for caps in refs.captures_iter(body) {
            let path = self.resolve(page, &caps[1])?;
            let bytes = self
                .fs
                .read(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            parts.push(bytes);
        }
        Ok(parts.join(&b'\n'))
    }
}

impl Transform for Useref {
    fn name(&self) -> &str {
        "useref"
    }

    fn apply(&self, contents: Vec<u8>, path: &Path) -> Result<TransformOutput> {
        let Ok(html) = String::from_utf8(contents) else {
            bail!("{} is not valid UTF-8", path.display());
        };

        let mut rewritten = String::with_capacity(html.len());
        let mut bundles: Vec<(PathBuf, Vec<u8>)> = Vec::new();
        let mut last = 0;

        for caps in BLOCK.captures_iter(&html) {
            let (Some(whole), Some(kind)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Some(kind) = BlockKind::parse(kind.as_str()) else {
                bail!("unknown build block type '{}'", kind.as_str());
            };
            let target = caps.get(2).map(|m| m.as_str());
            let body = caps.get(3).map_or("", |m| m.as_str());

            rewritten.push_str(&html[last..whole.start()]);
            last = whole.end();

            let replacement = match (kind, target) {
                (BlockKind::Remove, _) => String::new(),
                (_, None) => bail!("build:{} block without a target path", caps[1].to_string()),
                (BlockKind::Js, Some(t)) => format!(r#"<script src="{t}"></script>"#),
                (BlockKind::Css, Some(t)) => format!(r#"<link rel="stylesheet" href="{t}">"#),
            };
            rewritten.push_str(&replacement);

            if let Some(target) = target.filter(|_| kind != BlockKind::Remove) {
                let target = PathBuf::from(target.trim_start_matches('/'));
                if !is_contained(&target) {
                    bail!("bundle target '{}' points outside the output directory", target.display());
                }
                let contents = self.bundle(path, kind, body)?;
                debug!(page = ?path, bundle = ?target, bytes = contents.len(), "bundled build block");
                bundles.push((target, contents));
            }
        }

        rewritten.push_str(&html[last..]);

        let mut parts = Vec::with_capacity(bundles.len() + 1);
        parts.push((path.to_path_buf(), rewritten.into_bytes()));
        parts.extend(bundles);
        Ok(TransformOutput::Split(parts))
    }
}
