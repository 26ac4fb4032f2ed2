//! Built-in formatting helpers
//!
//! Every helper receives the already-resolved value (if any) and always
//! produces a string. Unusable input renders as an empty string.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde_json::Value;

use super::scope::{display, is_truthy};
use crate::parser::ast::Helper;

/// Apply a helper to a resolved value
pub fn apply(helper: Helper, value: Option<&Value>, fallback: &str) -> String {
    let value = value.filter(|v| !v.is_null());
    match helper {
        Helper::FormatDate => value.and_then(format_date).unwrap_or_default(),
        Helper::FormatCurrency => value.and_then(format_currency).unwrap_or_default(),
        Helper::Uppercase => case_map(value, str::to_uppercase),
        Helper::Lowercase => case_map(value, str::to_lowercase),
        Helper::Default => match value {
            Some(Value::String(s)) if s.is_empty() => fallback.to_string(),
            Some(v) => display(v),
            None => fallback.to_string(),
        },
    }
}

fn case_map(value: Option<&Value>, f: fn(&str) -> String) -> String {
    match value {
        Some(v) if is_truthy(Some(v)) => f(&display(v)),
        _ => String::new(),
    }
}

/// Long-form calendar date: `January 15, 2026`
pub fn format_date(value: &Value) -> Option<String> {
    let date = match value {
        Value::String(s) => parse_date(s.trim())?,
        Value::Number(n) => {
            let millis = n.as_i64().or_else(|| n.as_f64().map(|f| f as i64))?;
            DateTime::from_timestamp_millis(millis)?.date_naive()
        }
        _ => return None,
    };
    Some(date.format("%B %-d, %Y").to_string())
}

/// Parse the date representations portal data commonly carries
///
/// Timestamps with an offset keep the calendar date of that offset.
fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(ndt.date());
        }
    }
    for fmt in ["%Y-%m-%d", "%m/%d/%Y"] {
        if let Ok(nd) = NaiveDate::parse_from_str(s, fmt) {
            return Some(nd);
        }
    }
    None
}

/// US-dollar amount: `$1,234.56`
pub fn format_currency(value: &Value) -> Option<String> {
    let amount = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        Value::Bool(b) => f64::from(u8::from(*b)),
        _ => return None,
    };
    format_usd(amount)
}

/// Rounds the exact binary value of `amount` to cents, half away from zero
fn format_usd(amount: f64) -> Option<String> {
    let rounded = Decimal::from_f64_retain(amount)?
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let abs = rounded.abs();
    let dollars = abs.trunc().to_u128()?;
    let cents = (abs.fract() * Decimal::ONE_HUNDRED).to_u128()?;
    let sign = if rounded.is_sign_negative() && !abs.is_zero() { "-" } else { "" };
    Some(format!("{}${}.{:02}", sign, group_thousands(dollars), cents))
}

fn group_thousands(n: u128) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
