// src/transforms/mod.rs

//! Built-in transforms: page templating, build-comment bundling, minifiers.

pub mod minify;
pub mod template;
pub mod useref;

pub use minify::{minify_css, minify_html, minify_js, MinifyCss, MinifyHtml, MinifyJs};
pub use template::TemplateTransform;
pub use useref::Useref;
