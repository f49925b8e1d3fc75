//! Shared helpers for unit tests that talk HTTP to an in-process stub.

use std::net::SocketAddr;

use axum::Router;
use reqwest::Client;

/// Serve `router` on an ephemeral loopback port for the rest of the test.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// A client that never routes loopback traffic through an environment proxy.
pub fn client() -> Client {
    Client::builder().no_proxy().build().unwrap()
}

/// A resolver that has already loaded `config_text` from a temporary page
/// directory.
pub async fn loaded_resolver(config_text: &str) -> std::sync::Arc<crate::config::ConfigResolver> {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::write(dir.path().join(crate::config::source::CONFIG_FILE), config_text).unwrap();
    let page = reqwest::Url::from_file_path(dir.path().join("index.html")).unwrap();
    let resolver = crate::config::ConfigResolver::with_client(
        &page,
        crate::env::EnvSnapshot::empty(),
        client(),
    )
    .unwrap();
    resolver.load_config().await;
    std::sync::Arc::new(resolver)
}
