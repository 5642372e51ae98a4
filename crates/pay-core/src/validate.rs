//! # Payment Validation
//!
//! Pure checks applied to payment instruments before anything is persisted:
//!
//! - [`luhn_valid`]: mod-10 checksum over a 13–19 digit card number
//! - [`detect_network`]: card network from the leading one or two digits
//! - [`vpa_valid`]: UPI `local@handle` syntax
//! - [`is_expired`]: card expiry against the injected clock's month

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

const MIN_CARD_DIGITS: usize = 13;
const MAX_CARD_DIGITS: usize = 19;

/// Card network, as far as a two-digit prefix can tell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardNetwork {
    Visa,
    Mastercard,
    Amex,
    Rupay,
    Unknown,
}

impl CardNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardNetwork::Visa => "visa",
            CardNetwork::Mastercard => "mastercard",
            CardNetwork::Amex => "amex",
            CardNetwork::Rupay => "rupay",
            CardNetwork::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for CardNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Strip the spaces and dashes customers type between digit groups
pub fn clean_card_number(number: &str) -> String {
    number
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect()
}

/// Luhn checksum over a card number.
///
/// Returns `false` (never panics) for non-digit input or a cleaned length
/// outside 13..=19.
pub fn luhn_valid(number: &str) -> bool {
    let cleaned = clean_card_number(number);
    if cleaned.is_empty() || !cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if !(MIN_CARD_DIGITS..=MAX_CARD_DIGITS).contains(&cleaned.len()) {
        return false;
    }

    let mut digits = cleaned.bytes().rev().map(|b| u32::from(b - b'0'));
    // Length was checked above, so the check digit is always present.
    let check_digit = digits.next().unwrap_or(0);

    let sum: u32 = digits
        .enumerate()
        .map(|(i, d)| {
            if i % 2 == 1 {
                d
            } else {
                let doubled = d * 2;
                if doubled > 9 {
                    doubled - 9
                } else {
                    doubled
                }
            }
        })
        .sum();

    (sum + check_digit) % 10 == 0
}

/// Classify a card number by its leading digits
pub fn detect_network(number: &str) -> CardNetwork {
    let cleaned = clean_card_number(number);
    let mut prefix = cleaned.chars();
    let first = prefix.next();
    let second = prefix.next();

    match (first, second) {
        (Some('4'), _) => CardNetwork::Visa,
        (Some('5'), Some('1'..='5')) => CardNetwork::Mastercard,
        (Some('3'), Some('4' | '7')) => CardNetwork::Amex,
        (Some('6'), Some('0' | '5')) => CardNetwork::Rupay,
        (Some('8'), Some('1'..='9')) => CardNetwork::Rupay,
        _ => CardNetwork::Unknown,
    }
}

/// Last four digits of the cleaned card number
pub fn card_last4(number: &str) -> String {
    let cleaned: Vec<char> = clean_card_number(number).chars().collect();
    let start = cleaned.len().saturating_sub(4);
    cleaned[start..].iter().collect()
}

/// UPI virtual payment address syntax: `[A-Za-z0-9._-]+@[A-Za-z0-9]+`
pub fn vpa_valid(vpa: &str) -> bool {
    let Some((local, handle)) = vpa.split_once('@') else {
        return false;
    };

    let local_ok = !local.is_empty()
        && local
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'));
    let handle_ok = !handle.is_empty() && handle.chars().all(|c| c.is_ascii_alphanumeric());

    local_ok && handle_ok
}

/// Two-digit years are taken to be in the 2000s
pub fn normalize_expiry_year(year: u32) -> u32 {
    if year < 100 {
        year + 2000
    } else {
        year
    }
}

/// A card is expired once its expiry month has fully passed.
///
/// The current month itself is still valid.
pub fn is_expired(month: u32, year: u32, now: DateTime<Utc>) -> bool {
    let year = normalize_expiry_year(year);
    let (current_year, current_month) = (now.year() as u32, now.month());

    year < current_year || (year == current_year && month < current_month)
}
