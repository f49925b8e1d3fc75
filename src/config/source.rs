//! Locating and fetching the configuration resource.

use reqwest::{Client, StatusCode, Url};
use thiserror::Error;
use tracing::debug;

/// File name of the configuration resource.
pub const CONFIG_FILE: &str = "config.yaml";

/// Pages below this path segment live one directory deeper than the config.
const DASHBOARD_SEGMENT: &str = "/dashboard/";

const LOCAL_HOSTS: [&str; 2] = ["localhost", "127.0.0.1"];

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid config location: {0}")]
    Location(String),
    #[error("unsupported scheme '{0}'")]
    UnsupportedScheme(String),
    #[error("request to {url} failed: {message}")]
    Transport { url: String, message: String },
    #[error("failed to load config: {url} returned HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("cannot read {path}: {message}")]
    Io { path: String, message: String },
}

/// Where the configuration resource sits relative to the current page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigSource {
    /// `config.yaml`
    SameDir,
    /// `../config.yaml`
    ParentDir,
}

impl ConfigSource {
    /// Pick the source from the current page path and host.
    ///
    /// Pages under `/dashboard/` reach one directory up, but only on a local
    /// development host; deployed sites always use the same-directory path.
    pub fn resolve(page_path: &str, host: &str) -> Self {
        if !LOCAL_HOSTS.contains(&host) {
            return ConfigSource::SameDir;
        }
        if page_path.contains(DASHBOARD_SEGMENT) {
            ConfigSource::ParentDir
        } else {
            ConfigSource::SameDir
        }
    }

    pub fn relative_path(self) -> &'static str {
        match self {
            ConfigSource::SameDir => CONFIG_FILE,
            ConfigSource::ParentDir => "../config.yaml",
        }
    }

    /// Resolve against the page URL the way a browser resolves a relative fetch.
    pub fn locate(self, page_url: &Url) -> Result<Url, FetchError> {
        page_url
            .join(self.relative_path())
            .map_err(|e| FetchError::Location(format!("{page_url}: {e}")))
    }
}

/// Fetch `location` as text.
///
/// `http`/`https` go through `client`; `file` URLs are read from disk.
/// Non-2xx responses are errors.
pub async fn fetch_text(client: &Client, location: &Url) -> Result<String, FetchError> {
    match location.scheme() {
        "http" | "https" => fetch_http(client, location).await,
        "file" => {
            let path = location
                .to_file_path()
                .map_err(|()| FetchError::Location(location.to_string()))?;
            tokio::fs::read_to_string(&path).await.map_err(|e| FetchError::Io {
                path: path.display().to_string(),
                message: e.to_string(),
            })
        }
        other => Err(FetchError::UnsupportedScheme(other.to_string())),
    }
}

async fn fetch_http(client: &Client, location: &Url) -> Result<String, FetchError> {
    let transport = |e: reqwest::Error| FetchError::Transport {
        url: location.to_string(),
        message: e.to_string(),
    };

    let response = client.get(location.clone()).send().await.map_err(transport)?;
    let status = response.status();
    debug!(url = %location, %status, "config response");

    if !status.is_success() {
        return Err(FetchError::Status { url: location.to_string(), status });
    }
    response.text().await.map_err(transport)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dashboard_page_on_localhost_uses_parent() {
        assert_eq!(ConfigSource::resolve("/dashboard/index.html", "localhost"), ConfigSource::ParentDir);
        assert_eq!(ConfigSource::resolve("/dashboard/", "127.0.0.1"), ConfigSource::ParentDir);
    }

    #[test]
    fn other_pages_on_localhost_use_same_dir() {
        assert_eq!(ConfigSource::resolve("/index.html", "localhost"), ConfigSource::SameDir);
        assert_eq!(ConfigSource::resolve("/dashboard", "localhost"), ConfigSource::SameDir);
    }

    #[test]
    fn deployed_hosts_always_use_same_dir() {
        assert_eq!(
            ConfigSource::resolve("/dashboard/index.html", "www.example.com"),
            ConfigSource::SameDir
        );
        assert_eq!(ConfigSource::resolve("/dashboard/index.html", ""), ConfigSource::SameDir);
    }

    #[test]
    fn locate_joins_against_page() {
        let page = Url::parse("http://localhost:8000/dashboard/index.html").unwrap();
        let source = ConfigSource::resolve(page.path(), page.host_str().unwrap());
        assert_eq!(
            source.locate(&page).unwrap().as_str(),
            "http://localhost:8000/config.yaml"
        );

        let page = Url::parse("https://site.example/about/team.html").unwrap();
        assert_eq!(
            ConfigSource::SameDir.locate(&page).unwrap().as_str(),
            "https://site.example/about/config.yaml"
        );
    }

    #[tokio::test]
    async fn unsupported_scheme_is_rejected() {
        let url = Url::parse("ftp://files.example/config.yaml").unwrap();
        let err = fetch_text(&Client::new(), &url).await.unwrap_err();
        assert!(matches!(err, FetchError::UnsupportedScheme(s) if s == "ftp"));
    }
}
