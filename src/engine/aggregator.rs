//! Derived values for the overlay: latest and top donation, currency
//! rendering and name truncation.

use anyhow::Context;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::types::{parse_decimal, Donation, TrackerError};

/// Prefix for every rendered amount.
pub const CURRENCY_SYMBOL: char = '£';

/// Decimal places kept when rendering amounts.
const AMOUNT_DP: u32 = 3;

/// The most recent donation. Ties keep the first one seen.
pub fn select_latest(donations: &[Donation]) -> Result<&Donation, TrackerError> {
    let (first, rest) = donations.split_first().ok_or(TrackerError::EmptyInput)?;
    Ok(rest
        .iter()
        .fold(first, |latest, d| if d.date > latest.date { d } else { latest }))
}

/// The largest donation. Ties keep the first one seen.
pub fn select_top(donations: &[Donation]) -> Result<&Donation, TrackerError> {
    let (first, rest) = donations.split_first().ok_or(TrackerError::EmptyInput)?;
    Ok(rest
        .iter()
        .fold(first, |top, d| if d.amount > top.amount { d } else { top }))
}

/// Render an amount for display: rounded to 3 dp (half away from zero),
/// thousands grouped, `£` prefixed, then every comma swapped for a period.
///
/// The swap also hits the group separators, so `1234.5` renders as
/// `£1.234.5`. Overlays depend on that exact text.
pub fn format_currency(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(AMOUNT_DP, RoundingStrategy::MidpointAwayFromZero);
    let raised = format!("{CURRENCY_SYMBOL}{}", group_thousands(&rounded.to_string()));
    raised.replace(',', ".")
}

/// Render the page total as returned by the API. Same rounding, prefix and
/// comma swap as [`format_currency`], without inserting group separators.
pub fn format_total(raw: &str) -> anyhow::Result<String> {
    let amount = parse_decimal(raw)
        .with_context(|| format!("Total raised is not a number: {raw:?}"))?;
    let rounded = amount.round_dp_with_strategy(AMOUNT_DP, RoundingStrategy::MidpointAwayFromZero);
    Ok(format!("{CURRENCY_SYMBOL}{rounded}").replace(',', "."))
}

/// Keep at most `max_length` characters of `name`.
pub fn truncate_name(name: &str, max_length: usize) -> String {
    match name.char_indices().nth(max_length) {
        Some((cut, _)) => name[..cut].to_string(),
        None => name.to_string(),
    }
}

/// Insert `,` every three digits in the integer part of a plain decimal string.
fn group_thousands(plain: &str) -> String {
    let (sign, unsigned) = match plain.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", plain),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    match frac_part {
        Some(f) => format!("{sign}{grouped}.{f}"),
        None => format!("{sign}{grouped}"),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
