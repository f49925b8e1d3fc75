//! Site configuration: the resolved value tree and the resolver that fills it.
//!
//! The configuration resource is a small line-oriented `section:` /
//! `key: value` text file (see [`parse`]). It is located relative to the page
//! the client runs on ([`source`]), fetched once, and replaced by
//! [`defaults::default_config`] whenever it cannot be loaded.

pub mod defaults;
pub mod parse;
pub mod resolver;
pub mod source;

use std::collections::HashMap;
use std::fmt;

pub use defaults::default_config;
pub use parse::parse;
pub use resolver::ConfigResolver;
pub use source::{ConfigSource, FetchError};

/// A single setting value after type coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    Bool(bool),
    /// Numbers follow JavaScript number semantics, so everything is an `f64`.
    Number(f64),
    String(String),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ConfigValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::Bool(b) => write!(f, "{b}"),
            // Integral numbers print without a trailing `.0`.
            ConfigValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e21 => write!(f, "{n:.0}"),
            ConfigValue::Number(n) => write!(f, "{n}"),
            ConfigValue::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        ConfigValue::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        ConfigValue::String(s)
    }
}

impl From<f64> for ConfigValue {
    fn from(n: f64) -> Self {
        ConfigValue::Number(n)
    }
}

impl From<i64> for ConfigValue {
    fn from(n: i64) -> Self {
        ConfigValue::Number(n as f64)
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        ConfigValue::Bool(b)
    }
}

/// Key → value settings of one section.
pub type Section = HashMap<String, ConfigValue>;

/// A node reached by a dotted-path lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigEntry {
    Section(Section),
    Value(ConfigValue),
}

impl ConfigEntry {
    pub fn as_value(&self) -> Option<&ConfigValue> {
        match self {
            ConfigEntry::Value(v) => Some(v),
            ConfigEntry::Section(_) => None,
        }
    }

    pub fn as_section(&self) -> Option<&Section> {
        match self {
            ConfigEntry::Section(s) => Some(s),
            ConfigEntry::Value(_) => None,
        }
    }
}

/// Section name → section settings. Sections never nest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedConfig {
    sections: HashMap<String, Section>,
}

impl ResolvedConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) a section. An existing section of the same name is
    /// replaced by an empty one.
    pub fn open_section(&mut self, name: &str) {
        self.sections.insert(name.to_string(), Section::new());
    }

    /// Store `value` under `section.key`, creating the section if needed.
    /// Last write wins.
    pub fn insert(&mut self, section: &str, key: &str, value: impl Into<ConfigValue>) {
        self.sections
            .entry(section.to_string())
            .or_default()
            .insert(key.to_string(), value.into());
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.get(name)
    }

    pub fn sections(&self) -> impl Iterator<Item = (&String, &Section)> {
        self.sections.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Walk `path` segment by segment (`.` separated).
    ///
    /// Returns `None` as soon as a segment is missing or the current node is
    /// a scalar that cannot be descended into.
    pub fn lookup(&self, path: &str) -> Option<ConfigEntry> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let section = self.sections.get(first)?;

        let Some(key) = segments.next() else {
            return Some(ConfigEntry::Section(section.clone()));
        };
        let value = section.get(key)?;

        // Scalars are leaves: any further segment misses.
        if segments.next().is_some() {
            return None;
        }
        Some(ConfigEntry::Value(value.clone()))
    }

    /// Borrowing variant of [`lookup`](Self::lookup) for leaf values.
    pub fn value(&self, path: &str) -> Option<&ConfigValue> {
        let (section, key) = path.split_once('.')?;
        if key.contains('.') {
            return None;
        }
        self.sections.get(section)?.get(key)
    }
}
