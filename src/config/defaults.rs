//! Hardcoded fallback configuration.
//!
//! Used whenever the configuration resource cannot be fetched. Each value can
//! be overridden by a named parameter in the [`EnvSnapshot`].

use tracing::warn;

use crate::env::EnvSnapshot;

use super::ResolvedConfig;

pub const DEFAULT_API_BASE_URL: &str = "https://your-api-gateway.amazonaws.com/Prod/register";
pub const DEFAULT_VERIFICATION_API_URL: &str =
    "https://your-verification-api.amazonaws.com/Prod/send-verification";

/// Build the default configuration, applying overrides from `env`.
pub fn default_config(env: &EnvSnapshot) -> ResolvedConfig {
    let mut cfg = ResolvedConfig::new();

    cfg.insert("api", "base_url", env.get_or("API_BASE_URL", DEFAULT_API_BASE_URL));
    cfg.insert("api", "timeout", int_var(env, "API_TIMEOUT", 30_000));
    cfg.insert("api", "retry_attempts", int_var(env, "API_RETRY_ATTEMPTS", 3));

    cfg.insert(
        "twilio",
        "account_sid",
        env.get_or("TWILIO_ACCOUNT_SID", "YOUR_TWILIO_ACCOUNT_SID"),
    );
    cfg.insert(
        "twilio",
        "verify_service_sid",
        env.get_or("TWILIO_VERIFY_SERVICE_SID", "YOUR_TWILIO_VERIFY_SERVICE_SID"),
    );
    cfg.insert(
        "twilio",
        "verification_api_url",
        env.get_or("TWILIO_VERIFICATION_API_URL", DEFAULT_VERIFICATION_API_URL),
    );

    cfg.insert("dashboard", "refresh_interval", int_var(env, "DASHBOARD_REFRESH_INTERVAL", 30_000));
    cfg.insert(
        "dashboard",
        "chart_animation_duration",
        int_var(env, "DASHBOARD_CHART_ANIMATION_DURATION", 1_000),
    );
    cfg.insert(
        "dashboard",
        "default_time_range",
        env.get_or("DASHBOARD_DEFAULT_TIME_RANGE", "3m"),
    );

    cfg.insert("patient", "default_patient_id", env.get_or("PATIENT_DEFAULT_ID", "sarah_chen"));
    cfg.insert(
        "patient",
        "data_update_frequency",
        int_var(env, "PATIENT_DATA_UPDATE_FREQUENCY", 60_000),
    );

    cfg.insert("ui", "theme", env.get_or("UI_THEME", "light"));
    cfg.insert("ui", "language", env.get_or("UI_LANGUAGE", "en"));
    cfg.insert("ui", "timezone", env.get_or("UI_TIMEZONE", "UTC"));

    cfg
}

/// Integer override with `parseInt` leniency: leading whitespace and trailing
/// junk are tolerated (`"1500ms"` → 1500).
fn int_var(env: &EnvSnapshot, name: &str, default: i64) -> i64 {
    let Some(raw) = env.get(name) else {
        return default;
    };
    match leading_int(raw) {
        Some(n) => n,
        None => {
            warn!(var = name, value = raw, default, "ignoring non-numeric override");
            default
        }
    }
}

fn leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => (-1, &s[1..]),
        Some(b'+') => (1, &s[1..]),
        _ => (1, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    digits[..end].parse::<i64>().ok().map(|n| sign * n)
}
