//! Explicit snapshot of deployment environment parameters.
//!
//! Default configuration reads overrides from an `EnvSnapshot` passed in by
//! the caller rather than from the ambient process environment, so tests can
//! build one from literal pairs.

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
}

impl EnvSnapshot {
    /// An empty snapshot: every lookup misses.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Capture the current process environment. Call after `dotenvy::dotenv()`
    /// so `.env` entries are included.
    pub fn from_process() -> Self {
        Self { vars: std::env::vars().collect() }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }

    /// Look up `name`. Empty values count as unset.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|v| !v.is_empty())
    }

    pub fn get_or<'a>(&'a self, name: &str, default: &'a str) -> &'a str {
        self.get(name).unwrap_or(default)
    }
}
