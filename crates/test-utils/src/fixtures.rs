#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

/// Write `contents` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, contents: impl AsRef<[u8]>) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create fixture directory");
    }
    fs::write(&path, contents).expect("write fixture file");
    path
}

pub const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
  <head>
    <title>{{ title }}</title>
    <!-- build:css assets/styles/vendor.css -->
    <link rel="stylesheet" href="/node_modules/normalize/normalize.css">
    <!-- endbuild -->
    <!-- build:css assets/styles/main.css -->
    <link rel="stylesheet" href="assets/styles/main.css">
    <!-- endbuild -->
  </head>
  <body>
    <h1>{{ title }}</h1>
    <!-- build:js assets/scripts/main.js -->
    <script src="assets/scripts/main.js"></script>
    <!-- endbuild -->
  </body>
</html>
"#;

pub const MAIN_SCSS: &str = "body {\n  margin: 0;\n  color: #333333;\n}\n";

pub const MAIN_JS: &str = "// entry\nfunction greet(name) {\n  return 'hello ' + name;\n}\n\nconsole.log(greet('world'));\n";

pub const NORMALIZE_CSS: &str = "html {\n  line-height: 1.15;\n}\n";

/// Lay out a small project under `root` using the default directories:
/// one page, one script, one style, an image, a font, a public file and a
/// vendored stylesheet under `node_modules`.
pub fn sample_site(root: &Path) {
    write_file(root, "src/index.html", INDEX_HTML);
    write_file(root, "src/assets/styles/main.scss", MAIN_SCSS);
    write_file(root, "src/assets/scripts/main.js", MAIN_JS);
    write_file(root, "src/assets/images/logo.png", [0x89, b'P', b'N', b'G', 0, 1, 2, 3]);
    write_file(root, "src/assets/fonts/site.woff", [0x77, 0x4f, 0x46, 0x46, 9, 9]);
    write_file(root, "public/favicon.ico", [0, 0, 1, 0, 0xff, 0xfe]);
    write_file(root, "node_modules/normalize/normalize.css", NORMALIZE_CSS);
}

/// Every regular file under `root`, relative, `/`-separated, sorted.
pub fn list_files(root: &Path) -> Vec<String> {
    fn walk(dir: &Path, root: &Path, out: &mut Vec<String>) {
        let Ok(entries) = fs::read_dir(dir) else {
            return;
        };
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                walk(&path, root, out);
            } else if let Ok(rel) = path.strip_prefix(root) {
                out.push(rel.to_string_lossy().replace('\\', "/"));
            }
        }
    }

    let mut out = Vec::new();
    walk(root, root, &mut out);
    out.sort();
    out
}
