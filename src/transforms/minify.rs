// src/transforms/minify.rs

//! Minifiers for the bundle step.
//!
//! - JavaScript goes through `oxc` (parse, then print with the minifying
//!   code generator).
//! - CSS goes through `lightningcss`.
//! - HTML is handled here: comments (except conditional comments) are removed,
//!   whitespace runs collapse, and inline `<script>`/`<style>` bodies are
//!   minified with the two above. `<pre>` and `<textarea>` are kept verbatim.

use std::path::Path;
use std::sync::LazyLock;

use anyhow::{anyhow, Context, Result};
use lightningcss::stylesheet::{MinifyOptions, ParserOptions, PrinterOptions, StyleSheet};
use oxc_allocator::Allocator;
use oxc_codegen::{Codegen, CodegenOptions};
use oxc_parser::Parser;
use oxc_span::SourceType;
use regex::Regex;

use crate::pipeline::{Transform, TransformOutput};

static RAW_BLOCK_OPEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)<(script|style|pre|textarea)\b[^>]*>").expect("raw block regex is valid")
});
static COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").expect("comment regex is valid"));
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace regex is valid"));
/// A block-level or metadata tag with the whitespace around it. Whitespace
/// next to inline elements is rendered, so only these tags get trimmed.
static BLOCK_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\s*(</?(?:!doctype|html|head|body|title|meta|link|base|script|style|noscript|template|div|p|section|article|aside|header|footer|nav|main|h[1-6]|ul|ol|li|dl|dt|dd|table|thead|tbody|tfoot|tr|td|th|caption|colgroup|col|form|fieldset|legend|pre|blockquote|figure|figcaption|hr|address|details|summary|dialog|option|optgroup)\b[^>]*>)\s*",
    )
    .expect("block tag regex is valid")
});
static TYPE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\stype\s*=\s*["']?([^"'\s>]*)"#).expect("type attribute regex is valid")
});

pub fn minify_js(source: &str) -> Result<String> {
    let allocator = Allocator::default();
    let parsed = Parser::new(&allocator, source, SourceType::cjs()).parse();

    if parsed.panicked || !parsed.errors.is_empty() {
        let first = parsed
            .errors
            .first()
            .map(|e| e.to_string())
            .unwrap_or_else(|| "parser aborted".to_string());
        return Err(anyhow!("invalid JavaScript: {first}"));
    }

    let printed = Codegen::new()
        .with_options(CodegenOptions {
            minify: true,
            comments: false,
            ..CodegenOptions::default()
        })
        .build(&parsed.program);
    Ok(printed.code)
}

pub fn minify_css(source: &str) -> Result<String> {
    let mut sheet = StyleSheet::parse(source, ParserOptions::default())
        .map_err(|e| anyhow!("invalid CSS: {e}"))?;
    sheet
        .minify(MinifyOptions::default())
        .map_err(|e| anyhow!("CSS minify failed: {e}"))?;
    let printed = sheet
        .to_css(PrinterOptions {
            minify: true,
            ..PrinterOptions::default()
        })
        .map_err(|e| anyhow!("CSS print failed: {e}"))?;
    Ok(printed.code)
}

pub fn minify_html(source: &str) -> Result<String> {
    let mut out = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(open) = RAW_BLOCK_OPEN.captures(rest) {
        let (Some(whole), Some(tag)) = (open.get(0), open.get(1)) else {
            break;
        };
        let tag = tag.as_str().to_ascii_lowercase();
        let body_start = whole.end();
        let close = format!("</{tag}");
        let Some(body_len) = find_ascii_ci(&rest[body_start..], &close) else {
            break;
        };
        let body_end = body_start + body_len;

        let before = collapse_markup(&rest[..whole.start()]);
        if tag == "textarea" {
            out.push_str(&before);
        } else {
            out.push_str(before.trim_end());
        }
        out.push_str(whole.as_str());

        let body = &rest[body_start..body_end];
        match tag.as_str() {
            "script" if is_javascript(whole.as_str()) && !body.trim().is_empty() => {
                out.push_str(&minify_js(body).context("inline <script>")?)
            }
            "style" if !body.trim().is_empty() => {
                out.push_str(&minify_css(body).context("inline <style>")?)
            }
            _ => out.push_str(body),
        }

        rest = &rest[body_end..];
        // Copy the closing tag as is.
        let close_end = rest.find('>').map(|i| i + 1).unwrap_or(rest.len());
        out.push_str(&rest[..close_end]);
        rest = &rest[close_end..];
    }

    out.push_str(&collapse_markup(rest));
    Ok(out.trim().to_string())
}

fn collapse_markup(fragment: &str) -> String {
    let without_comments = COMMENT.replace_all(fragment, |caps: &regex::Captures<'_>| {
        let comment = &caps[0];
        if comment.starts_with("<!--[if") {
            comment.to_string()
        } else {
            String::new()
        }
    });
    let collapsed = WHITESPACE.replace_all(&without_comments, " ");
    BLOCK_TAG.replace_all(&collapsed, "$1").into_owned()
}

fn is_javascript(open_tag: &str) -> bool {
    match TYPE_ATTR.captures(open_tag).and_then(|caps| caps.get(1)) {
        None => true,
        Some(value) => {
            let value = value.as_str().to_ascii_lowercase();
            value.is_empty()
                || value == "text/javascript"
                || value == "module"
                || value == "application/javascript"
        }
    }
}

fn find_ascii_ci(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

fn utf8(contents: Vec<u8>, path: &Path) -> Result<String> {
    String::from_utf8(contents).map_err(|_| anyhow!("{} is not valid UTF-8", path.display()))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MinifyJs;

impl Transform for MinifyJs {
    fn name(&self) -> &str {
        "minify-js"
    }

    fn apply(&self, contents: Vec<u8>, path: &Path) -> Result<TransformOutput> {
        let source = utf8(contents, path)?;
        Ok(TransformOutput::Contents(minify_js(&source)?.into_bytes()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MinifyCss;

impl Transform for MinifyCss {
    fn name(&self) -> &str {
        "minify-css"
    }

    fn apply(&self, contents: Vec<u8>, path: &Path) -> Result<TransformOutput> {
        let source = utf8(contents, path)?;
        Ok(TransformOutput::Contents(minify_css(&source)?.into_bytes()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MinifyHtml;

impl Transform for MinifyHtml {
    fn name(&self) -> &str {
        "minify-html"
    }

    fn apply(&self, contents: Vec<u8>, path: &Path) -> Result<TransformOutput> {
        let source = utf8(contents, path)?;
        Ok(TransformOutput::Contents(minify_html(&source)?.into_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_output_drops_comments_and_layout() {
        let src = "// greet\nfunction greet(name) {\n    return 'hi ' + name;\n}\n\ngreet('x');\n";
        let out = minify_js(src).unwrap();
        assert!(!out.contains("greet\n"));
        assert!(!out.contains("//"));
        assert!(!out.contains("    "));
        assert!(out.contains("greet"));
        assert!(out.len() < src.len());
    }

    #[test]
    fn js_syntax_error_is_reported() {
        assert!(minify_js("function (").is_err());
    }

    #[test]
    fn css_is_compacted() {
        let out = minify_css("body {\n  color: red;\n  margin: 0px;\n}\n").unwrap();
        assert!(!out.contains('\n'));
        assert!(!out.contains("  "));
        assert!(out.starts_with("body{"));
    }

    #[test]
    fn html_collapses_but_keeps_pre_and_conditionals() {
        let src = "<html>\n  <!-- note -->\n  <!--[if IE]><p>old</p><![endif]-->\n  <body>\n    <pre>a\n  b</pre>\n    <p>one   two</p>\n  </body>\n</html>\n";
        let out = minify_html(src).unwrap();
        assert!(!out.contains("note"));
        assert!(out.contains("<!--[if IE]>"));
        assert!(out.contains("<pre>a\n  b</pre>"));
        assert!(out.contains("<p>one two</p>"));
        assert!(out.starts_with("<html><!--[if IE]>"));
    }

    #[test]
    fn html_minifies_inline_style() {
        let out = minify_html("<style>\n  p {\n    color: blue;\n  }\n</style>").unwrap();
        assert!(out.starts_with("<style>p{"));
        assert!(out.ends_with("</style>"));
        assert!(!out.contains('\n'));
    }

    #[test]
    fn html_keeps_spaces_between_inline_elements() {
        assert_eq!(
            minify_html("<p>Hello <b>big</b> <i>world</i></p>").unwrap(),
            "<p>Hello <b>big</b> <i>world</i></p>"
        );
        assert_eq!(
            minify_html("<div>\n  <b>a</b>\n  <i>b</i>\n</div>\n").unwrap(),
            "<div><b>a</b> <i>b</i></div>"
        );
        assert_eq!(
            minify_html("<ul>\n  <li><a href=\"/\">home</a></li>\n  <li>x</li>\n</ul>").unwrap(),
            "<ul><li><a href=\"/\">home</a></li><li>x</li></ul>"
        );
    }

    #[test]
    fn script_type_is_read_from_the_type_attribute_only() {
        assert!(is_javascript("<script>"));
        assert!(is_javascript(r#"<script type="module">"#));
        assert!(is_javascript(r#"<script data-type="text/x-template" src="a.js">"#));
        assert!(!is_javascript(r#"<script type="text/x-template">"#));
        assert!(!is_javascript(r#"<script data-id="1" type='application/ld+json'>"#));

        let template = r#"<script data-type="x" type="text/x-template"><p>{{ a }}</p></script>"#;
        assert_eq!(minify_html(template).unwrap(), template);
    }

    #[test]
    fn json_script_blocks_are_untouched() {
        let src = "<script type=\"application/json\">{ \"a\":  1 }</script>";
        assert_eq!(minify_html(src).unwrap(), src);
    }
}
