//! The process-wide configuration handle.
//!
//! Build one [`ConfigResolver`] per page at startup, wrap it in an `Arc`, and
//! hand it to every consumer. [`load_config`](ConfigResolver::load_config)
//! always leaves a usable configuration behind; lookups before that log a
//! warning and return `None`.

use std::sync::{Arc, PoisonError, RwLock};

use reqwest::{Client, Url};
use tracing::{error, info, warn};

use crate::env::EnvSnapshot;

use super::source::{self, ConfigSource, FetchError};
use super::{ConfigEntry, ConfigValue, ResolvedConfig, default_config, parse};

pub struct ConfigResolver {
    source: ConfigSource,
    location: Url,
    env: EnvSnapshot,
    client: Client,
    config: RwLock<Option<Arc<ResolvedConfig>>>,
}

impl ConfigResolver {
    /// Resolve the config location for `page_url`.
    ///
    /// `env` supplies the overrides used if the fallback configuration is
    /// ever needed.
    pub fn new(page_url: &Url, env: EnvSnapshot) -> Result<Self, FetchError> {
        Self::with_client(page_url, env, Client::new())
    }

    pub fn with_client(page_url: &Url, env: EnvSnapshot, client: Client) -> Result<Self, FetchError> {
        let host = page_url.host_str().unwrap_or_default();
        let source = ConfigSource::resolve(page_url.path(), host);
        let location = source.locate(page_url)?;
        Ok(Self {
            source,
            location,
            env,
            client,
            config: RwLock::new(None),
        })
    }

    pub fn source(&self) -> ConfigSource {
        self.source
    }

    /// Absolute location of the configuration resource.
    pub fn location(&self) -> &Url {
        &self.location
    }

    /// Fetch and parse the configuration, falling back to defaults on any
    /// failure. Calling again re-fetches and replaces the stored snapshot.
    pub async fn load_config(&self) -> Arc<ResolvedConfig> {
        info!(location = %self.location, "loading config");

        let config = match source::fetch_text(&self.client, &self.location).await {
            Ok(text) => {
                let parsed = parse(&text);
                info!(sections = parsed.sections().count(), "configuration loaded");
                parsed
            }
            Err(e) => {
                error!(error = %e, "error loading configuration");
                warn!("falling back to default configuration");
                default_config(&self.env)
            }
        };

        let config = Arc::new(config);
        *self.config.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&config));
        config
    }

    pub fn is_loaded(&self) -> bool {
        self.snapshot().is_some()
    }

    /// The loaded configuration, or `None` before the first load.
    pub fn snapshot(&self) -> Option<Arc<ResolvedConfig>> {
        self.config
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Dotted-path lookup, e.g. `"api.base_url"`.
    pub fn get(&self, path: &str) -> Option<ConfigEntry> {
        let Some(config) = self.snapshot() else {
            warn!(path, "configuration not loaded yet; call load_config() first");
            return None;
        };
        config.lookup(path)
    }

    pub fn get_value(&self, path: &str) -> Option<ConfigValue> {
        match self.get(path)? {
            ConfigEntry::Value(v) => Some(v),
            ConfigEntry::Section(_) => None,
        }
    }

    pub fn get_str(&self, path: &str) -> Option<String> {
        match self.get_value(path)? {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn get_number(&self, path: &str) -> Option<f64> {
        self.get_value(path)?.as_f64()
    }

    pub fn get_bool(&self, path: &str) -> Option<bool> {
        self.get_value(path)?.as_bool()
    }
}
