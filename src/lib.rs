//! Client side of the demo-intake marketing site.
//!
//! - [`config`]: locate, fetch and parse the site configuration, with a
//!   hardcoded fallback and dotted-path lookups.
//! - [`intake`]: demo request form validation and submission.
//! - [`verification`]: the two-step SMS verification handshake.
//! - [`session`]: the demo modal flow tying those together.

pub mod config;
pub mod env;
pub mod error;
pub mod intake;
pub mod logger;
pub mod phone;
pub mod session;
pub mod verification;

#[cfg(test)]
mod test_support;

pub use config::{ConfigEntry, ConfigResolver, ConfigSource, ConfigValue, ResolvedConfig};
pub use env::EnvSnapshot;
pub use error::AppError;
