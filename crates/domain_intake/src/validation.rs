//! Per-field input checks
//!
//! Pure predicates used by the wizard and by the sign-in screens that feed
//! it (email login, four-box OTP entry). Every function answers a yes/no
//! question; turning a "no" into a user-facing message is the caller's job.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::draft::DraftField;

/// Number of boxes on the OTP entry screen
pub const OTP_LENGTH: usize = 4;

/// One `@`, no whitespace, and a dot somewhere in the domain part
static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// Returns true iff the value is non-empty after trimming
pub fn validate_required(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Returns true iff the value looks like `local@domain.tld`
pub fn validate_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Returns true iff there are exactly four slots and each holds a single
/// ASCII digit
pub fn validate_otp<S: AsRef<str>>(digits: &[S]) -> bool {
    digits.len() == OTP_LENGTH && digits.iter().all(|slot| is_single_digit(slot.as_ref()))
}

/// Joins the OTP slots into the code sent to the backend, if they are valid
pub fn otp_code<S: AsRef<str>>(digits: &[S]) -> Option<String> {
    if !validate_otp(digits) {
        return None;
    }
    Some(digits.iter().map(|slot| slot.as_ref()).collect())
}

/// Returns the fields among `values` that fail [`validate_required`], in
/// the order given
pub fn missing_required(values: &[(DraftField, &str)]) -> Vec<DraftField> {
    values
        .iter()
        .filter(|(_, value)| !validate_required(value))
        .map(|(field, _)| *field)
        .collect()
}

fn is_single_digit(slot: &str) -> bool {
    let mut chars = slot.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_ascii_digit())
}
