// src/transforms/template.rs

//! Placeholder rendering for pages.
//!
//! Supports `{{ name }}` and dotted lookups (`{{ site.title }}`) into the
//! configured template data. Values are HTML-escaped unless the placeholder
//! ends in `| safe`. Unknown names render as the empty string. Everything
//! outside a placeholder is copied byte for byte.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::{anyhow, bail, Context, Result};
use regex::{Captures, Regex};

use crate::pipeline::{Transform, TransformOutput};

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*)\s*(\|\s*safe\s*)?\}\}")
        .expect("placeholder regex is valid")
});

#[derive(Debug, Clone)]
pub struct TemplateTransform {
    data: toml::Table,
}

impl TemplateTransform {
    pub fn new(data: toml::Table) -> Self {
        Self { data }
    }

    /// Render one template string.
    pub fn render(&self, source: &str) -> Result<String> {
        let mut failure = None;

        let rendered = PLACEHOLDER.replace_all(source, |caps: &Captures<'_>| {
            let key = &caps[1];
            let safe = caps.get(2).is_some();
            match self.lookup(key).map(|value| render_value(key, value)).transpose() {
                Ok(Some(text)) if safe => text,
                Ok(Some(text)) => escape_html(&text),
                Ok(None) => String::new(),
                Err(err) => {
                    failure.get_or_insert(err);
                    String::new()
                }
            }
        });

        match failure {
            Some(err) => Err(err),
            None => Ok(rendered.into_owned()),
        }
    }

    fn lookup(&self, key: &str) -> Option<&toml::Value> {
        let mut segments = key.split('.');
        let first = segments.next()?;
        let mut value = self.data.get(first)?;
        for segment in segments {
            value = value.as_table()?.get(segment)?;
        }
        Some(value)
    }
}

fn render_value(key: &str, value: &toml::Value) -> Result<String> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        toml::Value::Datetime(d) => Ok(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            Err(anyhow!("placeholder '{key}' refers to a {} and cannot be printed", value.type_str()))
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

impl Transform for TemplateTransform {
    fn name(&self) -> &str {
        "template"
    }

    fn apply(&self, contents: Vec<u8>, path: &Path) -> Result<TransformOutput> {
        let source = match String::from_utf8(contents) {
            Ok(s) => s,
            Err(_) => bail!("{} is not valid UTF-8", path.display()),
        };
        let rendered = self
            .render(&source)
            .with_context(|| format!("rendering {}", path.display()))?;
        Ok(TransformOutput::Contents(rendered.into_bytes()))
    }
}
