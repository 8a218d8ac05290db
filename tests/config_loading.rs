use std::path::PathBuf;
use std::sync::Arc;

use pageflow::config::{load_config, BuildConfig, FileConfigSource};
use pageflow::errors::PipelineError;
use pageflow::fs::RealFileSystem;
use pageflow::orchestrator::Project;
use pageflow_test_utils::fixtures::{list_files, write_file};
use pageflow_test_utils::{init_tracing, with_timeout, RecordingDevServer};

const CONFIG_FILE: &str = "pages.config.toml";

fn source_for(root: &std::path::Path) -> FileConfigSource {
    FileConfigSource::new(Arc::new(RealFileSystem), root.join(CONFIG_FILE))
}

#[test]
fn no_config_file_means_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = load_config(&source_for(dir.path()), dir.path()).unwrap();
    assert_eq!(cfg, BuildConfig::default_for(dir.path()));
    assert_eq!(cfg.server.port, 2080);
}

#[test]
fn broken_toml_falls_back_to_defaults() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), CONFIG_FILE, "[build\nsrc = ");

    let cfg = load_config(&source_for(dir.path()), dir.path()).unwrap();
    assert_eq!(cfg, BuildConfig::default_for(dir.path()));
}

#[test]
fn unknown_keys_are_ignored_and_known_keys_still_apply() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        CONFIG_FILE,
        "[build]\ndist = \"release\"\nminify = true\n\n[data]\ntitle = \"X\"\n",
    );

    let cfg = load_config(&source_for(dir.path()), dir.path()).unwrap();
    assert_eq!(cfg.dist_root, dir.path().join("release"));
    assert_eq!(cfg.source_root, dir.path().join("src"));
    assert_eq!(cfg.data.get("title").and_then(|v| v.as_str()), Some("X"));
}

#[test]
fn dist_spelled_as_the_source_dir_is_fatal_and_nothing_is_deleted() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "src/index.html", "<p>keep</p>");

    for dist in ["./src", "src/", "."] {
        write_file(dir.path(), CONFIG_FILE, format!("[build]\ndist = \"{dist}\"\n"));
        let err = load_config(&source_for(dir.path()), dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)), "{dist}: {err:?}");
    }
    assert!(dir.path().join("src/index.html").exists());
}

#[test]
fn override_that_fails_validation_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), CONFIG_FILE, "[build]\nsrc = \"out\"\ndist = \"out\"\n");

    let err = load_config(&source_for(dir.path()), dir.path()).unwrap_err();
    assert!(matches!(err, PipelineError::Config(ref msg) if msg.contains("build.src")));
}

#[tokio::test]
async fn overridden_roots_and_data_drive_the_build() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write_file(
        root,
        CONFIG_FILE,
        r#"
[build]
src = "app"
dist = "release"

[build.paths]
page = "pages/*.html"

[data]
title = "Override"

[data.site]
owner = "ops & co"
"#,
    );
    write_file(
        root,
        "app/pages/about.html",
        "<h1>{{ title }}</h1>\n<p>{{ site.owner }}</p>\n",
    );

    let cfg = load_config(&source_for(root), root).unwrap();
    assert_eq!(cfg.source_root, root.join("app"));
    assert_eq!(cfg.dist_root, PathBuf::from(root).join("release"));

    let project = Project::new(cfg, Arc::new(RealFileSystem), Arc::new(RecordingDevServer::new()));
    with_timeout(project.build().run()).await.unwrap();

    assert_eq!(list_files(&root.join("release")), ["pages/about.html"]);
    let html = std::fs::read_to_string(root.join("release/pages/about.html")).unwrap();
    assert_eq!(html, "<h1>Override</h1><p>ops &amp; co</p>");
}
