//! Logging setup for the CLI.
//!
//! The level comes from `--log-level`, then `INTAKE_LOG_LEVEL`, then `info`.
//! `RUST_LOG` overrides everything except an explicit flag.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

use crate::env::EnvSnapshot;
use crate::error::AppError;

pub const LEVEL_VAR: &str = "INTAKE_LOG_LEVEL";
pub const DEFAULT_LEVEL: &str = "info";

/// HTTP client internals are only interesting when something is broken.
const QUIET_TARGETS: &[&str] = &["hyper", "hyper_util", "reqwest", "rustls"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelSource {
    Flag,
    Env,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LevelFilter,
    pub source: LevelSource,
}

impl LogSettings {
    pub fn resolve(flag: Option<&str>, env: &EnvSnapshot) -> Result<Self, AppError> {
        let (raw, source) = match (flag, env.get(LEVEL_VAR)) {
            (Some(level), _) => (level, LevelSource::Flag),
            (None, Some(level)) => (level, LevelSource::Env),
            (None, None) => (DEFAULT_LEVEL, LevelSource::Default),
        };
        let level = parse_level(raw).map_err(|e| match source {
            LevelSource::Env => AppError::Logger(format!("{LEVEL_VAR}: {e}")),
            _ => e,
        })?;
        Ok(Self { level, source })
    }

    /// Filter directives: the chosen level for everything, with the HTTP
    /// stack held at `warn` unless logging is off or already quieter.
    pub fn directives(&self) -> String {
        let level = self.level.to_string().to_ascii_lowercase();
        if self.level <= LevelFilter::WARN {
            return level;
        }
        let quiet = QUIET_TARGETS.iter().map(|t| format!("{t}=warn"));
        std::iter::once(level).chain(quiet).collect::<Vec<_>>().join(",")
    }
}

/// Install the global subscriber, writing to stderr.
pub fn init(settings: &LogSettings) -> Result<(), AppError> {
    let directives = settings.directives();
    let filter = match settings.source {
        LevelSource::Flag => EnvFilter::try_new(&directives),
        LevelSource::Env | LevelSource::Default => {
            EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&directives))
        }
    }
    .map_err(|e| AppError::Logger(format!("invalid log filter '{directives}': {e}")))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::Logger(format!("failed to set subscriber: {e}")))
}

pub fn parse_level(level: &str) -> Result<LevelFilter, AppError> {
    if level.is_empty() {
        return Err(AppError::Logger("log level must not be empty".into()));
    }
    level
        .parse::<LevelFilter>()
        .map_err(|_| AppError::Logger(format!("unrecognised log level: '{level}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_beats_env_beats_default() {
        let env = EnvSnapshot::from_pairs([(LEVEL_VAR, "debug")]);

        let s = LogSettings::resolve(Some("trace"), &env).unwrap();
        assert_eq!((s.level, s.source), (LevelFilter::TRACE, LevelSource::Flag));

        let s = LogSettings::resolve(None, &env).unwrap();
        assert_eq!((s.level, s.source), (LevelFilter::DEBUG, LevelSource::Env));

        let s = LogSettings::resolve(None, &EnvSnapshot::empty()).unwrap();
        assert_eq!((s.level, s.source), (LevelFilter::INFO, LevelSource::Default));
    }

    #[test]
    fn bad_env_level_names_the_variable() {
        let env = EnvSnapshot::from_pairs([(LEVEL_VAR, "loud")]);
        let err = LogSettings::resolve(None, &env).unwrap_err();
        assert!(err.to_string().contains(LEVEL_VAR), "got: {err}");
        assert!(LogSettings::resolve(Some("verbose"), &EnvSnapshot::empty()).is_err());
    }

    #[test]
    fn directives_quiet_the_http_stack() {
        let debug = LogSettings { level: LevelFilter::DEBUG, source: LevelSource::Flag };
        let d = debug.directives();
        assert!(d.starts_with("debug,"), "got: {d}");
        assert!(d.contains("hyper=warn"));
        assert!(d.contains("reqwest=warn"));

        let warn = LogSettings { level: LevelFilter::WARN, source: LevelSource::Flag };
        assert_eq!(warn.directives(), "warn");
    }

    #[test]
    fn valid_levels_parse() {
        for l in &["error", "warn", "info", "debug", "trace"] {
            assert!(parse_level(l).is_ok(), "expected '{l}' to be valid");
        }
        assert!(parse_level("").is_err());
    }

    #[test]
    fn init_succeeds_or_already_init() {
        // Another test may have installed a subscriber first.
        let settings = LogSettings { level: LevelFilter::WARN, source: LevelSource::Default };
        match init(&settings) {
            Ok(()) => {}
            Err(AppError::Logger(msg)) if msg.contains("set subscriber") => {}
            Err(e) => panic!("unexpected error: {e}"),
        }
    }
}
