//! Forgiving conversion of free-text form fields into engine inputs.
//!
//! Cost fields are typed by hand and are often blank or half-edited. Rather
//! than rejecting them, anything that does not start with a number is read
//! as zero (amounts) or one (quantities).

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::types::{Money, Percent, Quantity};

/// Reads the leading decimal number of a field, ignoring any trailing text.
///
/// `"12.5kg"` reads as 12.5, `"1e3"` as 1000, and `""` or `"abc"` as zero.
pub fn parse_amount(raw: &str) -> Money {
    leading_decimal(raw).unwrap_or(Decimal::ZERO)
}

/// Reads a percentage field; blank or non-numeric yields `None`.
pub fn parse_percent(raw: &str) -> Option<Percent> {
    leading_decimal(raw)
}

/// Reads the leading integer of a quantity field. Non-positive or
/// non-numeric input becomes a quantity of one.
pub fn parse_quantity(raw: &str) -> Quantity {
    Quantity::from_optional(parse_quantity_raw(raw))
}

/// The signed leading integer of a quantity field, before flooring.
/// `None` when the field does not start with a number.
pub fn parse_quantity_raw(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = split_sign(s);
    let digits = take_digits(rest);
    if digits.is_empty() {
        return None;
    }
    // Digit strings too long for i64 saturate instead of wrapping.
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// Converts a float from a loosely typed caller. NaN and infinities become zero.
pub fn amount_from_f64(value: f64) -> Money {
    if !value.is_finite() {
        return Decimal::ZERO;
    }
    Decimal::from_f64(value).unwrap_or(Decimal::ZERO)
}

/// Treats an absent amount as zero.
pub fn amount_or_zero(value: Option<Money>) -> Money {
    value.unwrap_or(Decimal::ZERO)
}

fn leading_decimal(raw: &str) -> Option<Decimal> {
    let s = raw.trim_start();
    let (negative, rest) = split_sign(s);

    let int_part = take_digits(rest);
    let after_int = &rest[int_part.len()..];
    let frac_part = after_int
        .strip_prefix('.')
        .map(take_digits)
        .unwrap_or("");

    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let mut mantissa = String::with_capacity(int_part.len() + frac_part.len() + 3);
    if negative {
        mantissa.push('-');
    }
    mantissa.push_str(if int_part.is_empty() { "0" } else { int_part });
    if !frac_part.is_empty() {
        mantissa.push('.');
        mantissa.push_str(frac_part);
    }

    let consumed = int_part.len() + if frac_part.is_empty() { 0 } else { frac_part.len() + 1 };
    let tail = &rest[consumed..];
    if let Some(exponent) = leading_exponent(tail) {
        if let Ok(v) = Decimal::from_scientific(&format!("{mantissa}e{exponent}")) {
            return Some(v);
        }
    }

    Decimal::from_str(&mantissa).ok()
}

fn leading_exponent(tail: &str) -> Option<&str> {
    let rest = tail.strip_prefix(['e', 'E'])?;
    let sign_len = usize::from(rest.starts_with(['+', '-']));
    let digits = take_digits(&rest[sign_len..]);
    if digits.is_empty() {
        None
    } else {
        Some(&rest[..sign_len + digits.len()])
    }
}

fn split_sign(s: &str) -> (bool, &str) {
    if let Some(rest) = s.strip_prefix('-') {
        (true, rest)
    } else if let Some(rest) = s.strip_prefix('+') {
        (false, rest)
    } else {
        (false, s)
    }
}

fn take_digits(s: &str) -> &str {
    let end = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(s.len());
    &s[..end]
}
