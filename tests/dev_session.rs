use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use pageflow::errors::Result;
use pageflow::fs::RealFileSystem;
use pageflow::orchestrator::{DevSession, Project};
use pageflow::serve::ReloadOptions;
use pageflow_test_utils::fixtures::{sample_site, write_file};
use pageflow_test_utils::{init_tracing, with_timeout, ConfigBuilder, RecordingDevServer};

fn session(root: &Path) -> (DevSession, Arc<RecordingDevServer>) {
    session_with(root, ConfigBuilder::new())
}

fn session_with(root: &Path, builder: ConfigBuilder) -> (DevSession, Arc<RecordingDevServer>) {
    let server = Arc::new(RecordingDevServer::new());
    let project = Project::new(
        builder.port(4321).build(root),
        Arc::new(RealFileSystem),
        server.clone(),
    );
    (DevSession::new(project), server)
}

fn start(session: DevSession) -> (oneshot::Sender<()>, JoinHandle<Result<()>>) {
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let running = tokio::spawn(session.run(async move {
        let _ = stop_rx.await;
    }));
    (stop_tx, running)
}

/// Replace `src/index.html` in one step so the watcher never sees a
/// half-written page.
fn save_page(root: &Path, contents: &str) {
    let staged = write_file(root, "staged.html", contents);
    fs::rename(staged, root.join("src/index.html")).unwrap();
}

fn stream_reloads(server: &RecordingDevServer) -> usize {
    server
        .reloads()
        .iter()
        .filter(|r| **r == ReloadOptions::stream())
        .count()
}

async fn wait_for_page(root: &Path, server: &RecordingDevServer, expected: &str, reloads: usize) {
    let page = root.join("temp/index.html");
    let done = with_timeout(async {
        loop {
            let written = fs::read_to_string(&page).map(|p| p.contains(expected)).unwrap_or(false);
            if written && stream_reloads(server) >= reloads {
                break true;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await;
    assert!(done);
}

#[test]
fn serve_options_layer_temp_over_sources_and_public() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let (session, _server) = session(root);

    let options = session.serve_options();
    assert_eq!(options.port, 4321);
    assert_eq!(
        options.base_dirs,
        vec![root.join("temp"), root.join("src"), root.join("public")]
    );
    assert_eq!(
        options.routes.get("/node_modules"),
        Some(&PathBuf::from(root).join("node_modules"))
    );
}

#[test]
fn one_binding_per_watch_group() {
    let dir = tempfile::tempdir().unwrap();
    let (session, _server) = session(dir.path());

    let registry = session.bindings().unwrap();
    let names: Vec<&str> = registry.iter().map(|b| b.name()).collect();
    assert_eq!(names, ["pages", "scripts", "styles", "assets", "public"]);

    let roots = registry.roots();
    assert_eq!(roots, vec![dir.path().join("public"), dir.path().join("src")]);

    let hashed: Vec<&str> = registry
        .iter()
        .filter(|b| b.options().use_hash)
        .map(|b| b.name())
        .collect();
    assert_eq!(hashed, ["pages", "scripts", "styles"]);
}

#[tokio::test]
async fn public_file_change_triggers_a_full_reload() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    sample_site(&root);

    let (session, server) = session(&root);
    let (stop_tx, running) = start(session);

    // Give the watcher time to register before touching files.
    tokio::time::sleep(Duration::from_millis(300)).await;
    write_file(&root, "public/robots.txt", "User-agent: *\n");

    let reloaded = with_timeout(async {
        loop {
            if server.reloads().contains(&ReloadOptions::full()) {
                break true;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await;
    assert!(reloaded);
    assert_eq!(server.inits().len(), 1);

    stop_tx.send(()).unwrap();
    with_timeout(running).await.unwrap().unwrap();
}

#[tokio::test]
async fn page_change_recompiles_into_temp_and_stream_reloads_once() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    write_file(&root, "src/index.html", "<p>{{ title }}</p>");
    fs::create_dir_all(root.join("public")).unwrap();

    let (session, server) = session_with(&root, ConfigBuilder::new().data("title = \"First\""));
    let (stop_tx, running) = start(session);

    tokio::time::sleep(Duration::from_millis(300)).await;
    save_page(&root, "<p>{{ title }} again</p>");

    wait_for_page(&root, &server, "<p>First again</p>", 1).await;
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(stream_reloads(&server), 1);
    assert!(!server.reloads().contains(&ReloadOptions::full()));

    stop_tx.send(()).unwrap();
    with_timeout(running).await.unwrap().unwrap();
}

#[tokio::test]
async fn broken_page_keeps_the_session_alive_until_it_is_fixed() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().canonicalize().unwrap();
    write_file(&root, "src/index.html", "<p>{{ title }}</p>");
    fs::create_dir_all(root.join("public")).unwrap();

    let builder = ConfigBuilder::new().data("list = [1]\ntitle = \"T\"");
    let (session, server) = session_with(&root, builder);
    let (stop_tx, running) = start(session);

    tokio::time::sleep(Duration::from_millis(300)).await;
    save_page(&root, "<p>{{ list }}</p>");

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(!root.join("temp/index.html").exists());
    assert_eq!(stream_reloads(&server), 0);
    assert!(!running.is_finished());

    save_page(&root, "<p>{{ title }}</p>");
    wait_for_page(&root, &server, "<p>T</p>", 1).await;

    stop_tx.send(()).unwrap();
    with_timeout(running).await.unwrap().unwrap();
}
