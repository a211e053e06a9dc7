//! # Order Number Sequencing
//!
//! Derives the next daily-reset sequential order number from the last
//! issued one.
//!
//! ## Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Number Format                               │
//! │                                                                         │
//! │      2 6 0 8 3 0 0 4 2                                                  │
//! │      └─┬─┘ └─┬─┘ └─┬─┘                                                  │
//! │       YY    MM     │ ← zero-padded 3-digit daily sequence (001-999)    │
//! │           DD ──────┘                                                    │
//! │                                                                         │
//! │  • Sequence continues while the date prefix matches today              │
//! │  • Sequence resets to 001 when the date rolls over                     │
//! │  • Sequence past 999 is a hard error for that day                      │
//! │  • Unparseable previous numbers reset the sequence (never panic)       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The caller (OrderStore) reads the latest issued number for today's
//! prefix, derives the next one here, and relies on a UNIQUE constraint
//! plus a bounded retry for concurrent creates.

use chrono::NaiveDate;

use crate::error::{CoreError, CoreResult};
use crate::MAX_DAILY_ORDER_SEQUENCE;

/// Length of the `YYMMDD` date prefix.
const PREFIX_LEN: usize = 6;

/// Length of the zero-padded daily sequence.
const SEQUENCE_LEN: usize = 3;

/// Returns the `YYMMDD` prefix for a date.
///
/// Used by the order repository to range-scan today's numbers
/// (`WHERE order_number LIKE '260830%'`).
pub fn order_number_prefix(date: NaiveDate) -> String {
    date.format("%y%m%d").to_string()
}

/// Derives the next order number from the last issued one.
///
/// ## Arguments
/// * `last` - The highest order number issued so far (any day), or `None`
///   for an empty collection
/// * `today` - The current calendar date
///
/// ## Behavior
/// - `None` or a `last` from a previous day → first number of today (`001`)
/// - `last` from today → sequence + 1
/// - `last` from today with sequence 999 → [`CoreError::OrderNumbersExhausted`]
/// - Malformed `last` → sequence resets to 001 (matches the original
///   system, which ignored unparseable previous numbers)
///
/// ## Example
/// ```rust
/// use opsdesk_core::order_number::next_order_number;
/// use chrono::NaiveDate;
///
/// let today = NaiveDate::from_ymd_opt(2026, 8, 30).unwrap();
/// assert_eq!(next_order_number(None, today).unwrap(), "260830001");
/// assert_eq!(next_order_number(Some("260830007"), today).unwrap(), "260830008");
/// // Yesterday's number resets the sequence
/// assert_eq!(next_order_number(Some("260829999"), today).unwrap(), "260830001");
/// ```
pub fn next_order_number(last: Option<&str>, today: NaiveDate) -> CoreResult<String> {
    let prefix = order_number_prefix(today);

    let sequence = match last {
        Some(last) => match parse_sequence(last, &prefix) {
            Some(seq) if seq >= MAX_DAILY_ORDER_SEQUENCE => {
                return Err(CoreError::OrderNumbersExhausted { date: today });
            }
            Some(seq) => seq + 1,
            // Different day or malformed number: start over
            None => 1,
        },
        None => 1,
    };

    Ok(format!("{prefix}{sequence:0width$}", width = SEQUENCE_LEN))
}

/// Extracts the daily sequence from an order number if it belongs to
/// `prefix` and is well-formed.
fn parse_sequence(number: &str, prefix: &str) -> Option<u32> {
    if number.len() != PREFIX_LEN + SEQUENCE_LEN {
        return None;
    }
    let (date_part, seq_part) = number.split_at(PREFIX_LEN);
    if date_part != prefix {
        return None;
    }
    seq_part.parse::<u32>().ok()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 30).unwrap()
    }

    #[test]
    fn test_first_number_of_day() {
        assert_eq!(next_order_number(None, today()).unwrap(), "260830001");
    }

    #[test]
    fn test_sequence_continues_same_day() {
        assert_eq!(
            next_order_number(Some("260830001"), today()).unwrap(),
            "260830002"
        );
        assert_eq!(
            next_order_number(Some("260830041"), today()).unwrap(),
            "260830042"
        );
    }

    #[test]
    fn test_sequence_resets_on_new_day() {
        // Previous day's number, even a high one, resets to 001
        assert_eq!(
            next_order_number(Some("260829999"), today()).unwrap(),
            "260830001"
        );
    }

    #[test]
    fn test_sequence_zero_padding() {
        assert_eq!(
            next_order_number(Some("260830009"), today()).unwrap(),
            "260830010"
        );
        assert_eq!(
            next_order_number(Some("260830099"), today()).unwrap(),
            "260830100"
        );
    }

    #[test]
    fn test_overflow_is_fatal_for_the_day() {
        let err = next_order_number(Some("260830999"), today()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::OrderNumbersExhausted { date } if date == today()
        ));
    }

    #[test]
    fn test_last_allowed_number() {
        assert_eq!(
            next_order_number(Some("260830998"), today()).unwrap(),
            "260830999"
        );
    }

    #[test]
    fn test_malformed_last_resets() {
        assert_eq!(
            next_order_number(Some("garbage"), today()).unwrap(),
            "260830001"
        );
        assert_eq!(
            next_order_number(Some("260830"), today()).unwrap(),
            "260830001"
        );
        assert_eq!(
            next_order_number(Some("26083000a"), today()).unwrap(),
            "260830001"
        );
    }

    #[test]
    fn test_prefix_format() {
        assert_eq!(order_number_prefix(today()), "260830");
        let new_year = NaiveDate::from_ymd_opt(2027, 1, 1).unwrap();
        assert_eq!(order_number_prefix(new_year), "270101");
    }
}
