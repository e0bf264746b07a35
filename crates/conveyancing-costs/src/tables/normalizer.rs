use rust_decimal::Decimal;
use std::str::FromStr;

const CURRENCY_SYMBOLS: &[char] = &['R', 'r', '$', '£', '€'];

/// `" Purchase-Price "` becomes `"purchase_price"`.
pub(crate) fn normalize_header(value: &str) -> String {
    let cleaned = value.replace(['\u{feff}', '\u{200b}'], "");
    let collapsed = cleaned.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .to_ascii_lowercase()
        .chars()
        .map(|ch| match ch {
            ' ' | '-' => '_',
            other => other,
        })
        .collect()
}

/// Parses an amount like `"R 1,250,000.00"`. Returns `None` when the cleaned text is not a number.
pub fn parse_amount(value: &str) -> Option<Decimal> {
    let trimmed = value.trim();
    let unsigned = trimmed.strip_prefix(CURRENCY_SYMBOLS).unwrap_or(trimmed);
    let digits: String = unsigned
        .chars()
        .filter(|ch| !matches!(ch, ',' | ' ' | '\u{a0}'))
        .collect();

    if digits.is_empty() {
        return None;
    }

    Decimal::from_str(&digits).ok()
}
