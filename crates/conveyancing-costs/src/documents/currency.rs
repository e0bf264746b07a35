use rust_decimal::Decimal;

use crate::tables::exporter::two_decimals;

pub const CURRENCY_SYMBOL: &str = "R";

/// Formats an amount the way quotes show it: `R1,234,567.89`.
pub fn format_rand(amount: Decimal) -> String {
    let fixed = two_decimals(amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount.is_sign_negative() && !amount.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{CURRENCY_SYMBOL}{grouped}.{cents}")
}
