//! Adapter layer: converts the engine's f64 metrics into `Decimal` for
//! display, so narrative text never shows float noise like `$4.999999`.

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Placeholder rendered wherever an operand is missing.
pub const MISSING: &str = "—";

/// Convert f64 to Decimal (lossy; non-finite values collapse to zero).
pub fn to_decimal(v: f64) -> Decimal {
    Decimal::from_f64(v).unwrap_or(Decimal::ZERO)
}

fn round_cents(v: f64) -> Decimal {
    to_decimal(v).round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Group the integer digits of an unsigned decimal string with commas.
fn group_thousands(digits: &str) -> String {
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (digits, None),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    match frac_part {
        Some(f) => format!("{}.{}", grouped, f),
        None => grouped,
    }
}

/// `$1,234.56`, `-$5.00`.
pub fn currency(v: f64) -> String {
    let rounded = round_cents(v);
    let body = group_thousands(&format!("{:.2}", rounded.abs()));
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-${}", body)
    } else {
        format!("${}", body)
    }
}

pub fn currency_opt(v: Option<f64>) -> String {
    v.map(currency).unwrap_or_else(|| MISSING.to_string())
}

/// One-decimal percentage: `87.5%`.
pub fn percent(v: f64) -> String {
    let rounded = to_decimal(v).round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.1}%", rounded)
}

pub fn percent_opt(v: Option<f64>) -> String {
    v.map(percent).unwrap_or_else(|| MISSING.to_string())
}

/// Signed percentage-point delta: `+0.40 pp`, `-1.25 pp`.
pub fn points(v: f64) -> String {
    let rounded = round_cents(v);
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("{:.2} pp", rounded)
    } else {
        format!("+{:.2} pp", rounded.abs())
    }
}

/// Whole-number count with thousands separators: `1,250`.
pub fn count(v: f64) -> String {
    let rounded = to_decimal(v).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let body = group_thousands(&format!("{:.0}", rounded.abs()));
    if rounded.is_sign_negative() && !rounded.is_zero() {
        format!("-{}", body)
    } else {
        body
    }
}

/// Plain two-decimal number for ratios and frequencies.
pub fn ratio(v: f64) -> String {
    format!("{:.2}", round_cents(v))
}
