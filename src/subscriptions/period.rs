//! Billing period validation
//!
//! A period is a calendar month written as `MM-YYYY`. Only the shape is
//! checked: month `01`..`12`, a dash, four digits. Any four-digit year is
//! accepted.

use super::error::SubscriptionError;
use once_cell::sync::Lazy;
use regex::Regex;

static PERIOD_PATTERN: Lazy<Regex> = Lazy::new(|| {
    // `[0-9]` rather than `\d`, which would also match non-ASCII digits.
    Regex::new(r"^(0[1-9]|1[0-2])-[0-9]{4}$").expect("period pattern is a valid regex")
});

/// Check whether `value` is a well-formed `MM-YYYY` period
pub fn is_valid_period(value: &str) -> bool {
    PERIOD_PATTERN.is_match(value)
}

/// Validate a period-valued field, naming the field in the error
///
/// # Returns
/// * `Ok(())` - `value` is a well-formed period
/// * `Err(SubscriptionError::Validation)` - otherwise
pub fn validate_period(field: &str, value: &str) -> Result<(), SubscriptionError> {
    if is_valid_period(value) {
        Ok(())
    } else {
        Err(SubscriptionError::Validation(format!(
            "{} must be in MM-YYYY format",
            field
        )))
    }
}
