//! Formatting helpers for amounts and dates

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

/// Group an integer digit string with Indian separators (e.g. "12,34,567")
pub fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }

    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    let mut rest = head;
    while rest.len() > 2 {
        let (left, right) = rest.split_at(rest.len() - 2);
        groups.push(right);
        rest = left;
    }
    if !rest.is_empty() {
        groups.push(rest);
    }
    groups.reverse();

    format!("{},{}", groups.join(","), tail)
}

/// Format an amount with a currency symbol, e.g. "₹1,50,000.00" or "-₹500.00"
pub fn format_currency(amount: Decimal, symbol: &str, decimal_places: u32) -> String {
    let rounded = amount.round_dp_with_strategy(decimal_places, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    let text = format!("{:.*}", decimal_places as usize, rounded.abs());

    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    out.push_str(symbol);
    out.push_str(&group_indian(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Format a date as "10 May 2023"
pub fn format_date(date: NaiveDate) -> String {
    date.format("%d %b %Y").to_string()
}
