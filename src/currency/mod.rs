//! Money presentation for CLI and report output.

use serde::{Deserialize, Serialize};

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("GBP")
    }
}

/// Separators used when rendering numbers for a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NumberFormat {
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl Default for NumberFormat {
    fn default() -> Self {
        Self {
            decimal_separator: '.',
            grouping_separator: ',',
        }
    }
}

impl NumberFormat {
    /// Picks separators from a BCP 47 tag such as `en-GB` or `de-DE`.
    pub fn for_locale(tag: &str) -> Self {
        let language = tag
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match language.as_str() {
            "de" | "es" | "it" | "nl" | "pt" | "da" => Self {
                decimal_separator: ',',
                grouping_separator: '.',
            },
            "fr" | "sv" | "nb" | "fi" => Self {
                decimal_separator: ',',
                grouping_separator: ' ',
            },
            _ => Self::default(),
        }
    }
}

pub fn symbol_for(code: &str) -> String {
    match code {
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        "JPY" => "¥".into(),
        "AUD" => "A$".into(),
        _ => code.into(),
    }
}

pub fn minor_units_for(code: &str) -> u8 {
    match code {
        "JPY" => 0,
        "KWD" | "BHD" => 3,
        _ => 2,
    }
}

pub fn format_number(format: &NumberFormat, value: f64, precision: u8) -> String {
    let rendered = format!("{:.*}", precision as usize, value.abs());
    let (int_part, fraction) = match rendered.split_once('.') {
        Some((int_part, fraction)) => (int_part, Some(fraction)),
        None => (rendered.as_str(), None),
    };
    let mut body = group_digits(int_part, format.grouping_separator);
    if let Some(fraction) = fraction {
        body.push(format.decimal_separator);
        body.push_str(fraction);
    }
    if value < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        body.insert(0, '-');
    }
    body
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

/// Renders `amount` with the currency symbol, rounded to its minor units.
pub fn format_amount(amount: f64, code: &CurrencyCode, locale: &str) -> String {
    let format = NumberFormat::for_locale(locale);
    let body = format_number(&format, amount.abs(), minor_units_for(code.as_str()));
    let sign = if amount < 0.0 && body.chars().any(|c| c.is_ascii_digit() && c != '0') {
        "-"
    } else {
        ""
    };
    format!("{}{}{}", sign, symbol_for(code.as_str()), body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands_for_uk_locale() {
        let gbp = CurrencyCode::new("gbp");
        assert_eq!(format_amount(1234567.891, &gbp, "en-GB"), "£1,234,567.89");
        assert_eq!(format_amount(-42.5, &gbp, "en-GB"), "-£42.50");
    }

    #[test]
    fn continental_separators_and_zero_decimals() {
        let eur = CurrencyCode::new("EUR");
        assert_eq!(format_amount(9876.5, &eur, "de-DE"), "€9.876,50");
        let yen = CurrencyCode::new("JPY");
        assert_eq!(format_amount(1500.4, &yen, "en-US"), "¥1,500");
    }

    #[test]
    fn rounding_to_zero_drops_the_sign() {
        let gbp = CurrencyCode::default();
        assert_eq!(format_amount(-0.001, &gbp, "en-GB"), "£0.00");
        assert_eq!(format_number(&NumberFormat::default(), -0.004, 2), "0.00");
    }
}
