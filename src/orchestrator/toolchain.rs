// src/orchestrator/toolchain.rs

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::pipeline::{Passthrough, RenameExtension, Transform};
use crate::transforms::TemplateTransform;
use crate::types::AssetCategory;

/// Per-category transform chains used by the category pipelines.
///
/// [`Toolchain::builtin`] gives every category its default chain. Script
/// transpiling and image/font compression are external tools; the built-ins
/// for them pass contents through unchanged, and the style step only maps
/// `.scss` to `.css`. Replace a chain with [`Toolchain::with`] to plug in a
/// real implementation.
#[derive(Clone, Default)]
pub struct Toolchain {
    chains: BTreeMap<AssetCategory, Vec<Arc<dyn Transform>>>,
}

impl fmt::Debug for Toolchain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (category, chain) in &self.chains {
            let names: Vec<&str> = chain.iter().map(|t| t.name()).collect();
            map.entry(category, &names);
        }
        map.finish()
    }
}

impl Toolchain {
    /// No transforms anywhere; every pipeline copies.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builtin(template_data: &toml::Table) -> Self {
        Self::empty()
            .with(AssetCategory::Pages, vec![stage(TemplateTransform::new(template_data.clone()))])
            .with(AssetCategory::Scripts, vec![stage(Passthrough::new("transpile"))])
            .with(
                AssetCategory::Styles,
                vec![stage(RenameExtension::new("style-compile", "scss", "css"))],
            )
            .with(AssetCategory::Images, vec![stage(Passthrough::new("compress"))])
            .with(AssetCategory::Fonts, vec![stage(Passthrough::new("compress"))])
    }

    pub fn with(mut self, category: AssetCategory, chain: Vec<Arc<dyn Transform>>) -> Self {
        self.chains.insert(category, chain);
        self
    }

    pub fn chain(&self, category: AssetCategory) -> &[Arc<dyn Transform>] {
        self.chains.get(&category).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn stage(transform: impl Transform + 'static) -> Arc<dyn Transform> {
    Arc::new(transform)
}
