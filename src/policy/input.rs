//! Locale-aware text boundary (tr-TR conventions)
//!
//! Form fields arrive as text: `.` groups thousands and `,` is the decimal
//! separator. Everything here turns that text into plain numbers before it
//! reaches the engine. Unparseable text becomes 0, the same as an empty
//! field, so a garbage salary is reported as "missing". That ambiguity is
//! kept; a warning is logged whenever non-empty text that is not a written
//! zero collapses to 0.

use serde::{Deserialize, Serialize};

use super::params::CalculationParams;

/// Parse an integer that may carry grouping characters (`100.000` → 100000).
/// Every non-digit is dropped; returns 0 when no digits remain.
pub fn parse_grouped_integer(text: &str) -> f64 {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 0.0;
    }
    digits.parse::<f64>().unwrap_or(0.0)
}

/// Parse a decimal-comma number (`1.234,56` → 1234.56).
///
/// All `.` are removed, the first `,` becomes the decimal point and the
/// longest numeric prefix is read (`12,5%` → 12.5). Returns 0 on failure.
pub fn parse_decimal_comma(text: &str) -> f64 {
    let sanitized = text.replace('.', "").replacen(',', ".", 1);
    leading_number(&sanitized).unwrap_or(0.0)
}

/// Longest prefix of `text` (after leading whitespace) that reads as a float
fn leading_number(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        digits += frac_end - frac_start;
        end = frac_end;
    }
    if digits == 0 {
        return None;
    }

    // Exponent only counts when followed by at least one digit
    if end < bytes.len() && (bytes[end] == b'e' || bytes[end] == b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    text[..end].parse::<f64>().ok()
}

/// Format a value as a rounded integer with `.` grouping (`100000` → `100.000`)
pub fn format_grouped(value: f64) -> String {
    let rounded = value.round();
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        format!("-{}", grouped)
    } else {
        grouped
    }
}

/// Format a decimal rate as a percentage with a decimal comma (0.0624 → `6,24`)
pub fn format_percent(rate: f64) -> String {
    format_decimal_comma(rate * 100.0, 4)
}

/// Format with up to `max_decimals` places, trailing zeros trimmed, `,` as
/// decimal separator and no grouping
pub fn format_decimal_comma(value: f64, max_decimals: usize) -> String {
    let fixed = format!("{:.*}", max_decimals, value);
    let trimmed = if fixed.contains('.') {
        fixed.trim_end_matches('0').trim_end_matches('.')
    } else {
        fixed.as_str()
    };
    let out = trimmed.replace('.', ",");
    if out == "-0" {
        "0".to_string()
    } else {
        out
    }
}

/// Raw form fields exactly as typed. Rates are percentages (`6,24`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormInput {
    pub monthly_salary: String,
    pub monthly_premium_usd: String,
    pub usd_try: String,
    pub annual_salary_growth: String,
    pub annual_premium_growth: String,
    pub annual_usd_growth: String,
    pub annual_profit_rate: String,
    pub annual_profit_rate_growth: String,
    pub annual_expense_rate: String,
    pub annual_tax_bracket_growth: String,
}

impl FormInput {
    /// Form text matching [`CalculationParams::form_defaults`]
    pub fn defaults() -> Self {
        Self {
            monthly_salary: "100.000".into(),
            monthly_premium_usd: "100".into(),
            usd_try: String::new(),
            annual_salary_growth: "15".into(),
            annual_premium_growth: "0".into(),
            annual_usd_growth: "15".into(),
            annual_profit_rate: "6,24".into(),
            annual_profit_rate_growth: "0".into(),
            annual_expense_rate: "5".into(),
            annual_tax_bracket_growth: "15".into(),
        }
    }

    /// Parse every field. Percentages are divided by 100.
    pub fn to_params(&self) -> CalculationParams {
        CalculationParams {
            monthly_salary: checked("monthly_salary", &self.monthly_salary, parse_grouped_integer),
            monthly_premium_usd: checked(
                "monthly_premium_usd",
                &self.monthly_premium_usd,
                parse_decimal_comma,
            ),
            usd_try: checked("usd_try", &self.usd_try, parse_decimal_comma),
            annual_salary_growth: percent("annual_salary_growth", &self.annual_salary_growth),
            annual_premium_growth: percent("annual_premium_growth", &self.annual_premium_growth),
            annual_usd_growth: percent("annual_usd_growth", &self.annual_usd_growth),
            annual_profit_rate: percent("annual_profit_rate", &self.annual_profit_rate),
            annual_profit_rate_growth: percent(
                "annual_profit_rate_growth",
                &self.annual_profit_rate_growth,
            ),
            annual_expense_rate: percent("annual_expense_rate", &self.annual_expense_rate),
            annual_tax_bracket_growth: percent(
                "annual_tax_bracket_growth",
                &self.annual_tax_bracket_growth,
            ),
        }
    }
}

/// Whether non-empty text collapsed to 0 without spelling a zero
fn is_unparseable(text: &str, value: f64) -> bool {
    value == 0.0 && !text.trim().is_empty() && !is_zero_text(text)
}

/// A zero written with optional sign, separators, spaces or `%`
fn is_zero_text(text: &str) -> bool {
    text.contains('0')
        && text
            .chars()
            .all(|c| matches!(c, '0' | '.' | ',' | '+' | '-' | '%') || c.is_whitespace())
}

fn checked(field: &str, text: &str, parse: fn(&str) -> f64) -> f64 {
    let value = parse(text);
    if is_unparseable(text, value) {
        log::warn!("Field {} could not be parsed ({:?}); treating it as 0", field, text);
    }
    value
}

fn percent(field: &str, text: &str) -> f64 {
    checked(field, text, parse_decimal_comma) / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_grouped_integer() {
        assert_eq!(parse_grouped_integer("100.000"), 100_000.0);
        assert_eq!(parse_grouped_integer("1.250.000 ₺"), 1_250_000.0);
        assert_eq!(parse_grouped_integer(""), 0.0);
        assert_eq!(parse_grouped_integer("abc"), 0.0);
    }

    #[test]
    fn test_parse_decimal_comma() {
        assert_eq!(parse_decimal_comma("6,24"), 6.24);
        assert_eq!(parse_decimal_comma("1.234,5"), 1234.5);
        assert_eq!(parse_decimal_comma("41,9500"), 41.95);
        assert_eq!(parse_decimal_comma("15"), 15.0);
        assert_eq!(parse_decimal_comma(" 12,5%"), 12.5);
        assert_eq!(parse_decimal_comma("-3"), -3.0);
        assert_eq!(parse_decimal_comma("1e3"), 1000.0);
        assert_eq!(parse_decimal_comma("2e"), 2.0);
    }

    #[test]
    fn test_garbage_and_empty_both_parse_to_zero() {
        assert_eq!(parse_decimal_comma(""), 0.0);
        assert_eq!(parse_decimal_comma("abc"), 0.0);
        assert_eq!(parse_decimal_comma(","), 0.0);
        assert_eq!(parse_decimal_comma("-"), 0.0);
    }

    #[test]
    fn test_unparseable_text_is_flagged() {
        // A digit after the leading junk still collapses to 0
        assert_eq!(parse_decimal_comma("abc5"), 0.0);
        assert!(is_unparseable("abc5", parse_decimal_comma("abc5")));
        assert!(is_unparseable("abc", 0.0));
        assert!(is_unparseable(",", 0.0));

        assert!(!is_unparseable("", 0.0));
        assert!(!is_unparseable("   ", 0.0));
        assert!(!is_unparseable("0", 0.0));
        assert!(!is_unparseable("0,00", 0.0));
        assert!(!is_unparseable("-0 %", 0.0));
        assert!(!is_unparseable("abc5", 5.0));
    }

    #[test]
    fn test_format_grouped() {
        assert_eq!(format_grouped(100_000.0), "100.000");
        assert_eq!(format_grouped(999.0), "999");
        assert_eq!(format_grouped(1_234_567.6), "1.234.568");
        assert_eq!(format_grouped(0.0), "0");
        assert_eq!(format_grouped(-4_500.0), "-4.500");
    }

    #[test]
    fn test_format_percent_and_decimal_comma() {
        assert_eq!(format_percent(0.0624), "6,24");
        assert_eq!(format_percent(0.15), "15");
        assert_eq!(format_decimal_comma(41.98, 4), "41,98");
        assert_eq!(format_decimal_comma(33.0, 2), "33");
    }

    #[test]
    fn test_form_defaults_match_param_defaults() {
        let params = FormInput::defaults().to_params();
        let expected = CalculationParams::form_defaults();

        assert_eq!(params.monthly_salary, expected.monthly_salary);
        assert_eq!(params.monthly_premium_usd, expected.monthly_premium_usd);
        assert_eq!(params.usd_try, 0.0);
        assert_relative_eq!(params.annual_profit_rate, expected.annual_profit_rate);
        assert_relative_eq!(params.annual_expense_rate, expected.annual_expense_rate);
        assert_relative_eq!(params.annual_salary_growth, expected.annual_salary_growth);
        assert_relative_eq!(
            params.annual_tax_bracket_growth,
            expected.annual_tax_bracket_growth
        );
        assert!(params.validate().is_err());
    }
}
