//! Line-oriented parser for the site configuration resource.
//!
//! The format is a tiny YAML-looking subset:
//!
//! ```text
//! # comment
//! api:
//!   base_url: "https://example.com"   # inline comment
//!   timeout: 5000
//!   enabled: true
//! ```
//!
//! Parsing never fails. Lines that fit no rule are skipped, so a damaged file
//! degrades one line at a time instead of being rejected as a whole.

use tracing::trace;

use super::{ConfigValue, ResolvedConfig};

/// Parse configuration text into a [`ResolvedConfig`].
pub fn parse(text: &str) -> ResolvedConfig {
    let mut config = ResolvedConfig::new();
    let mut current_section: Option<String> = None;

    for (idx, line) in text.split('\n').enumerate() {
        let line = line.trim();

        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(name) = section_header(line) {
            config.open_section(name);
            current_section = Some(name.to_string());
            continue;
        }

        let Some(section) = current_section.as_deref() else {
            trace!(line = idx + 1, "skipping line outside any section");
            continue;
        };

        let Some((key, raw)) = line.split_once(':') else {
            trace!(line = idx + 1, "skipping line without key separator");
            continue;
        };

        config.insert(section, key.trim(), coerce(strip_comment(raw.trim())));
    }

    config
}

/// A header is a line ending in `:` with no space anywhere in it.
fn section_header(line: &str) -> Option<&str> {
    if line.contains(' ') {
        return None;
    }
    line.strip_suffix(':')
}

fn strip_comment(value: &str) -> &str {
    match value.find('#') {
        Some(idx) => value[..idx].trim(),
        None => value,
    }
}

/// Turn a raw value into a typed one: boolean literal, number, quoted string,
/// or the text as-is, checked in that order.
pub fn coerce(value: &str) -> ConfigValue {
    match value {
        "true" => return ConfigValue::Bool(true),
        "false" => return ConfigValue::Bool(false),
        _ => {}
    }

    // The empty string is not a number, even though lenient number parsers
    // read it as zero.
    if !value.is_empty() {
        if let Some(n) = parse_number(value) {
            return ConfigValue::Number(n);
        }
    }

    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        return ConfigValue::String(value[1..value.len() - 1].to_string());
    }

    ConfigValue::String(value.to_string())
}

/// Number recognition with JavaScript `Number()` rules: decimal and
/// exponent forms, `Infinity`, and unsigned `0x`/`0o`/`0b` integers.
fn parse_number(s: &str) -> Option<f64> {
    match s {
        "Infinity" | "+Infinity" => return Some(f64::INFINITY),
        "-Infinity" => return Some(f64::NEG_INFINITY),
        _ => {}
    }

    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return parse_radix(&s[2..], radix);
    }

    // Rust's float parser also accepts `inf` and `nan`; those are not numbers here.
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return None;
    }
    s.parse::<f64>().ok()
}

fn parse_radix(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d))
    })
}
