//! Phone-number and verification-code input handling.

/// US numbers only: ten national digits.
pub const PHONE_DIGITS: usize = 10;
/// Length of the code the verification service sends.
pub const CODE_DIGITS: usize = 6;
/// Country code sent alongside every phone number.
pub const COUNTRY_CODE: &str = "+1";

/// Keep only ASCII digits.
pub fn digits(raw: &str) -> String {
    raw.chars().filter(char::is_ascii_digit).collect()
}

/// Reformat free-form input as `XXX-XXX-XXXX` while the user types.
///
/// Non-digits are dropped and anything past the tenth digit is discarded.
/// Partial input is formatted as far as it goes (`555`, `555-12`).
pub fn format_phone(raw: &str) -> String {
    let mut d = digits(raw);
    d.truncate(PHONE_DIGITS);

    match d.len() {
        0..=3 => d,
        4..=6 => format!("{}-{}", &d[..3], &d[3..]),
        _ => format!("{}-{}-{}", &d[..3], &d[3..6], &d[6..]),
    }
}

/// True when `raw` holds exactly ten digits once punctuation is removed.
pub fn is_complete_phone(raw: &str) -> bool {
    digits(raw).len() == PHONE_DIGITS
}

/// Digits-only view of the verification-code field.
pub fn sanitize_code(raw: &str) -> String {
    digits(raw)
}

pub fn is_complete_code(code: &str) -> bool {
    code.len() == CODE_DIGITS && code.chars().all(|c| c.is_ascii_digit())
}
