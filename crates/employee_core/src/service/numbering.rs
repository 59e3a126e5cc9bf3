//! Employee number derivation.
//!
//! # Invariants
//! - The next number keeps the last number's prefix and at least its digit
//!   width; only the trailing digit run changes.
//! - An empty store starts at `{prefix}{1 padded to width}`.
//! - Issued numbers are ranked by the value of their trailing digit run, so
//!   `EMP-10000` outranks `EMP-9999`.

use crate::config::NumberingConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static TRAILING_DIGITS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<prefix>.*?)(?P<digits>[0-9]+)$").expect("valid trailing digits regex")
});

/// The last issued number cannot be continued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NumberingError {
    #[error("employee number `{0}` has no trailing digits to increment")]
    NoTrailingDigits(String),
    #[error("employee number `{0}` cannot be incremented without overflow")]
    Overflow(String),
}

/// Derives the number that follows `last`.
///
/// # Examples
/// - `None` with defaults -> `EMP-0001`
/// - `Some("EMP-0041")` -> `EMP-0042`
/// - `Some("EMP-9999")` -> `EMP-10000`
pub fn next_employee_number(
    last: Option<&str>,
    numbering: &NumberingConfig,
) -> Result<String, NumberingError> {
    let Some(last) = last else {
        return Ok(format!(
            "{}{:0width$}",
            numbering.prefix,
            1,
            width = numbering.width
        ));
    };

    let captures = TRAILING_DIGITS_RE
        .captures(last.trim())
        .ok_or_else(|| NumberingError::NoTrailingDigits(last.to_string()))?;
    let prefix = &captures["prefix"];
    let digits = &captures["digits"];

    let next = digits
        .parse::<u64>()
        .ok()
        .and_then(|current| current.checked_add(1))
        .ok_or_else(|| NumberingError::Overflow(last.to_string()))?;

    Ok(format!("{prefix}{next:0width$}", width = digits.len()))
}

/// Highest of `numbers` by trailing digit value, or `None` when empty.
///
/// Ties on value fall back to the full text; numbers without trailing
/// digits rank below every numbered one.
pub fn highest_issued<'a, I>(numbers: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    numbers
        .into_iter()
        .max_by(|left, right| issue_rank(left).cmp(&issue_rank(right)))
}

fn issue_rank(number: &str) -> (bool, usize, &str, &str) {
    match TRAILING_DIGITS_RE
        .captures(number.trim())
        .and_then(|captures| captures.name("digits"))
    {
        Some(digits) => {
            let significant = digits.as_str().trim_start_matches('0');
            (true, significant.len(), significant, number)
        }
        None => (false, 0, "", number),
    }
}

#[cfg(test)]
mod tests {
    use super::{highest_issued, next_employee_number, NumberingError};
    use crate::config::NumberingConfig;

    #[test]
    fn empty_store_starts_at_one() {
        let numbering = NumberingConfig::default();
        assert_eq!(next_employee_number(None, &numbering).unwrap(), "EMP-0001");

        let custom = NumberingConfig {
            prefix: "STAFF/".to_string(),
            width: 6,
        };
        assert_eq!(next_employee_number(None, &custom).unwrap(), "STAFF/000001");
    }

    #[test]
    fn increments_trailing_digits_keeping_prefix_and_width() {
        let numbering = NumberingConfig::default();
        assert_eq!(
            next_employee_number(Some("EMP-0041"), &numbering).unwrap(),
            "EMP-0042"
        );
        assert_eq!(
            next_employee_number(Some("EMP-9999"), &numbering).unwrap(),
            "EMP-10000"
        );
        assert_eq!(
            next_employee_number(Some("2024-07"), &numbering).unwrap(),
            "2024-08"
        );
    }

    #[test]
    fn rejects_numbers_without_trailing_digits() {
        let err = next_employee_number(Some("EMP-X"), &NumberingConfig::default()).unwrap_err();
        assert_eq!(err, NumberingError::NoTrailingDigits("EMP-X".to_string()));
    }

    #[test]
    fn rejects_overflowing_digit_runs() {
        let err = next_employee_number(Some("EMP-99999999999999999999999"), &NumberingConfig::default())
            .unwrap_err();
        assert!(matches!(err, NumberingError::Overflow(_)));
    }

    #[test]
    fn highest_issued_compares_digit_values_not_text() {
        assert_eq!(highest_issued(Vec::new()), None);
        assert_eq!(
            highest_issued(["EMP-0005", "EMP-0002"]),
            Some("EMP-0005")
        );
        assert_eq!(
            highest_issued(["EMP-10000", "EMP-9999", "EMP-0042"]),
            Some("EMP-10000")
        );
        assert_eq!(highest_issued(["LEGACY", "EMP-0001"]), Some("EMP-0001"));
    }
}
