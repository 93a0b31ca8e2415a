use std::collections::HashMap;
use std::io::{Cursor, Write};
use std::path::Path;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect};
use axum::routing::get;
use minilisp_assets::{
    AssetFetcher, FetchError, HttpSettings, LOADER_ENTRY, MODULE_ENTRY, fetch_and_install_assets,
};
use tokio::net::TcpListener;
use url::Url;
use zip::write::SimpleFileOptions;

const WASM: &[u8] = b"\0asm\x01\0\0\0\x01\x04\x01\x60\0\0";
const LOADER: &[u8] = b"var Module = typeof Module !== 'undefined' ? Module : {};";

// ============================================================================
// Test server infrastructure
// ============================================================================

struct TestServer {
    base_url: Url,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    async fn new(router: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

        let server = axum::serve(listener, router).with_graceful_shutdown(async {
            shutdown_rx.await.ok();
        });

        tokio::spawn(async move {
            server.await.unwrap();
        });

        Self {
            base_url: Url::parse(&format!("http://{addr}")).unwrap(),
            shutdown_tx: Some(shutdown_tx),
        }
    }

    fn url(&self, path: &str) -> Url {
        self.base_url.join(path).unwrap()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for &(name, data) in entries {
        writer.start_file(name, options).unwrap();
        writer.write_all(data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn release_archive() -> Vec<u8> {
    zip_archive(&[(MODULE_ENTRY, WASM), (LOADER_ENTRY, LOADER)])
}

fn serve_bytes(path: &str, body: Vec<u8>) -> Router {
    Router::new().route(path, get(move || async move { body }))
}

fn dir_is_empty(path: &Path) -> bool {
    std::fs::read_dir(path).unwrap().next().is_none()
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn installs_both_entries_byte_for_byte() {
    let server = TestServer::new(serve_bytes("/mini_lisp_wasm.zip", release_archive())).await;
    let dest = tempfile::tempdir().unwrap();

    let installed =
        fetch_and_install_assets(&server.url("/mini_lisp_wasm.zip"), false, dest.path())
            .await
            .unwrap();

    assert_eq!(installed.files.len(), 2);
    assert_eq!(std::fs::read(dest.path().join(MODULE_ENTRY)).unwrap(), WASM);
    assert_eq!(std::fs::read(dest.path().join(LOADER_ENTRY)).unwrap(), LOADER);
    assert_eq!(std::fs::read_dir(dest.path()).unwrap().count(), 2);
}

#[tokio::test]
async fn missing_entry_writes_nothing() {
    let body = zip_archive(&[(MODULE_ENTRY, WASM), ("README.md", &b"notes"[..])]);
    let server = TestServer::new(serve_bytes("/mini_lisp_wasm.zip", body)).await;
    let dest = tempfile::tempdir().unwrap();

    let err = fetch_and_install_assets(&server.url("/mini_lisp_wasm.zip"), false, dest.path())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::MissingEntry { ref name } if name == LOADER_ENTRY));
    assert!(dir_is_empty(dest.path()));
}

#[tokio::test]
async fn missing_module_writes_nothing() {
    let body = zip_archive(&[(LOADER_ENTRY, LOADER)]);
    let server = TestServer::new(serve_bytes("/mini_lisp_wasm.zip", body)).await;
    let dest = tempfile::tempdir().unwrap();

    let err = fetch_and_install_assets(&server.url("/mini_lisp_wasm.zip"), false, dest.path())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::MissingEntry { ref name } if name == MODULE_ENTRY));
    assert!(dir_is_empty(dest.path()));
}

#[tokio::test]
async fn proxy_receives_original_url_as_target() {
    let targets: Arc<Mutex<Vec<String>>> = Arc::default();
    let body = release_archive();

    async fn proxy(
        State((targets, body)): State<(Arc<Mutex<Vec<String>>>, Vec<u8>)>,
        Query(params): Query<HashMap<String, String>>,
    ) -> impl IntoResponse {
        match params.get("target") {
            Some(target) => {
                targets.lock().unwrap().push(target.clone());
                (StatusCode::OK, body).into_response()
            },
            None => StatusCode::BAD_REQUEST.into_response(),
        }
    }

    let router = Router::new()
        .route("/proxy", get(proxy))
        .with_state((Arc::clone(&targets), body));
    let server = TestServer::new(router).await;
    let dest = tempfile::tempdir().unwrap();

    let base = Url::parse(minilisp_config::DEFAULT_SOURCE_URL).unwrap();
    let fetcher = AssetFetcher::new()
        .unwrap()
        .with_proxy_endpoint(server.url("/proxy"));

    let effective = fetcher.effective_url(&base, true).unwrap();
    assert_eq!(
        effective.query(),
        Some(
            "target=https%3A%2F%2Fgithub.com%2Fpku-software%2Fmini_lisp%2Freleases%2Fdownload%2Fv20220301.r1%2Fmini_lisp_wasm.zip"
        )
    );

    fetcher
        .fetch_and_install(&base, true, dest.path())
        .await
        .unwrap();

    assert_eq!(*targets.lock().unwrap(), vec![base.to_string()]);
    assert_eq!(std::fs::read(dest.path().join(MODULE_ENTRY)).unwrap(), WASM);
}

#[tokio::test]
async fn non_archive_body_is_invalid_archive() {
    let server = TestServer::new(serve_bytes(
        "/mini_lisp_wasm.zip",
        b"<!DOCTYPE html><title>rate limited</title>".to_vec(),
    ))
    .await;
    let dest = tempfile::tempdir().unwrap();

    let err = fetch_and_install_assets(&server.url("/mini_lisp_wasm.zip"), false, dest.path())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::InvalidArchive { .. }));
    assert!(dir_is_empty(dest.path()));
}

#[tokio::test]
async fn rerun_produces_identical_files() {
    let server = TestServer::new(serve_bytes("/mini_lisp_wasm.zip", release_archive())).await;
    let dest = tempfile::tempdir().unwrap();
    let url = server.url("/mini_lisp_wasm.zip");

    fetch_and_install_assets(&url, false, dest.path())
        .await
        .unwrap();
    let first = (
        std::fs::read(dest.path().join(MODULE_ENTRY)).unwrap(),
        std::fs::read(dest.path().join(LOADER_ENTRY)).unwrap(),
    );

    fetch_and_install_assets(&url, false, dest.path())
        .await
        .unwrap();
    let second = (
        std::fs::read(dest.path().join(MODULE_ENTRY)).unwrap(),
        std::fs::read(dest.path().join(LOADER_ENTRY)).unwrap(),
    );

    assert_eq!(first, second);
    assert_eq!(first.0, WASM);
}

#[tokio::test]
async fn connection_refused_is_network_failure() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let url = Url::parse(&format!("http://127.0.0.1:{port}/mini_lisp_wasm.zip")).unwrap();
    let dest = tempfile::tempdir().unwrap();

    let err = fetch_and_install_assets(&url, false, dest.path())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::NetworkFailure { .. }));
    assert!(dir_is_empty(dest.path()));
}

#[tokio::test]
async fn error_status_is_network_failure() {
    let router = Router::new().route(
        "/mini_lisp_wasm.zip",
        get(|| async { (StatusCode::NOT_FOUND, "Not Found") }),
    );
    let server = TestServer::new(router).await;
    let dest = tempfile::tempdir().unwrap();

    let err = fetch_and_install_assets(&server.url("/mini_lisp_wasm.zip"), false, dest.path())
        .await
        .unwrap_err();

    match err {
        FetchError::NetworkFailure { message, .. } => assert!(message.contains("404")),
        other => panic!("expected NetworkFailure, got {other:?}"),
    }
    assert!(dir_is_empty(dest.path()));
}

#[tokio::test]
async fn follows_release_redirect() {
    let body = release_archive();
    let router = Router::new()
        .route(
            "/releases/download/v20220301.r1/mini_lisp_wasm.zip",
            get(|| async { Redirect::temporary("/objects/mini_lisp_wasm.zip") }),
        )
        .route("/objects/mini_lisp_wasm.zip", get(move || async move { body }));
    let server = TestServer::new(router).await;
    let dest = tempfile::tempdir().unwrap();

    fetch_and_install_assets(
        &server.url("/releases/download/v20220301.r1/mini_lisp_wasm.zip"),
        false,
        dest.path(),
    )
    .await
    .unwrap();

    assert_eq!(std::fs::read(dest.path().join(LOADER_ENTRY)).unwrap(), LOADER);
}

#[tokio::test]
async fn oversized_download_is_rejected() {
    let server = TestServer::new(serve_bytes("/mini_lisp_wasm.zip", release_archive())).await;
    let dest = tempfile::tempdir().unwrap();

    let settings = HttpSettings {
        max_download_size: 16,
        ..HttpSettings::default()
    };
    let fetcher = AssetFetcher::new()
        .unwrap()
        .with_http_settings(&settings)
        .unwrap();

    let err = fetcher
        .fetch_and_install(&server.url("/mini_lisp_wasm.zip"), false, dest.path())
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::ArchiveTooLarge { limit: 16, .. }));
    assert!(dir_is_empty(dest.path()));
}

#[tokio::test]
async fn missing_destination_fails_after_download() {
    let server = TestServer::new(serve_bytes("/mini_lisp_wasm.zip", release_archive())).await;
    let root = tempfile::tempdir().unwrap();
    let dest = root.path().join("docs/.vuepress/public");

    let err = fetch_and_install_assets(&server.url("/mini_lisp_wasm.zip"), false, &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::FilesystemFailure { .. }));
    assert!(!dest.exists());
}
