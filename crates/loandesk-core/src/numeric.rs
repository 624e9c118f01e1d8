//! NaN-free numeric conversion and display formatting
//!
//! Every numeric value that reaches the page (form inputs, table cells, the
//! balance display) passes through [`safe_number`] first, so the formatters
//! below never have to deal with `NaN` or infinities.
//!
//! ## Example
//!
//! ```
//! use loandesk_core::numeric::{format_currency, format_percentage, safe_number};
//!
//! assert_eq!(safe_number("", 0.0), 0.0);
//! assert_eq!(safe_number("12.5kg", 0.0), 12.5);
//! assert_eq!(format_currency(1234.5), "₹1,234.50");
//! assert_eq!(format_percentage(7), "7.00%");
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Leading float literal, the same prefix a browser's `parseFloat` accepts.
static FLOAT_PREFIX: LazyLock<Option<Regex>> =
	LazyLock::new(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").ok());

/// Percentages are always shown with two decimals, independent of the
/// currency precision.
const PERCENTAGE_DECIMALS: usize = 2;

/// An untyped value as it arrives from the DOM, a data attribute or a grid cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RawValue<'a> {
	/// Absent value (`null`, `undefined`, missing attribute)
	Missing,
	/// Textual value, parsed with float-prefix rules
	Text(&'a str),
	/// Already numeric value
	Number(f64),
	/// Boolean value, never numeric
	Bool(bool),
}

impl<'a> From<&'a str> for RawValue<'a> {
	fn from(value: &'a str) -> Self {
		Self::Text(value)
	}
}

impl<'a> From<&'a String> for RawValue<'a> {
	fn from(value: &'a String) -> Self {
		Self::Text(value.as_str())
	}
}

impl From<f64> for RawValue<'_> {
	fn from(value: f64) -> Self {
		Self::Number(value)
	}
}

impl From<f32> for RawValue<'_> {
	fn from(value: f32) -> Self {
		Self::Number(f64::from(value))
	}
}

impl From<i32> for RawValue<'_> {
	fn from(value: i32) -> Self {
		Self::Number(f64::from(value))
	}
}

impl From<i64> for RawValue<'_> {
	fn from(value: i64) -> Self {
		Self::Number(value as f64)
	}
}

impl From<u32> for RawValue<'_> {
	fn from(value: u32) -> Self {
		Self::Number(f64::from(value))
	}
}

impl From<bool> for RawValue<'_> {
	fn from(value: bool) -> Self {
		Self::Bool(value)
	}
}

impl<'a, T> From<Option<T>> for RawValue<'a>
where
	T: Into<RawValue<'a>>,
{
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Missing, Into::into)
	}
}

impl<'a> From<&'a serde_json::Value> for RawValue<'a> {
	fn from(value: &'a serde_json::Value) -> Self {
		match value {
			serde_json::Value::Null => Self::Missing,
			serde_json::Value::Bool(b) => Self::Bool(*b),
			serde_json::Value::Number(n) => n.as_f64().map_or(Self::Missing, Self::Number),
			serde_json::Value::String(s) => Self::Text(s.as_str()),
			// Composite values have no numeric reading
			serde_json::Value::Array(_) | serde_json::Value::Object(_) => Self::Missing,
		}
	}
}

/// Parses the leading float literal of `text`, ignoring leading whitespace.
///
/// Returns `None` when the text does not start with a number. Trailing
/// garbage is ignored (`"12abc"` parses as `12`).
pub fn parse_float_prefix(text: &str) -> Option<f64> {
	let text = text.trim_start();
	let regex = FLOAT_PREFIX.as_ref()?;
	let literal = regex.find(text)?.as_str();
	literal.parse::<f64>().ok()
}

/// Converts any raw value to a finite number.
///
/// Returns `default` when the value is missing, empty, not numeric or not
/// finite. A non-finite `default` is itself replaced by `0.0`, so the result
/// is never `NaN`.
///
/// # Examples
///
/// ```
/// use loandesk_core::numeric::safe_number;
///
/// assert_eq!(safe_number("42", 0.0), 42.0);
/// assert_eq!(safe_number("abc", 7.0), 7.0);
/// assert_eq!(safe_number(None::<&str>, 1.5), 1.5);
/// assert_eq!(safe_number(f64::NAN, 0.0), 0.0);
/// ```
pub fn safe_number<'a>(value: impl Into<RawValue<'a>>, default: f64) -> f64 {
	let default = if default.is_finite() { default } else { 0.0 };
	let parsed = match value.into() {
		RawValue::Missing | RawValue::Bool(_) => None,
		RawValue::Text("") => None,
		RawValue::Text(text) => parse_float_prefix(text),
		RawValue::Number(n) => Some(n),
	};
	parsed.filter(|n| n.is_finite()).unwrap_or(default)
}

/// Display format for money and percentages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberFormat {
	/// Glyph prefixed to currency values
	pub currency_symbol: String,
	/// Fraction digits shown for currency values
	pub decimal_places: usize,
}

impl Default for NumberFormat {
	fn default() -> Self {
		Self {
			currency_symbol: "₹".to_string(),
			decimal_places: 2,
		}
	}
}

impl NumberFormat {
	/// Creates a format with the given currency glyph and precision
	pub fn new(currency_symbol: impl Into<String>, decimal_places: usize) -> Self {
		Self {
			currency_symbol: currency_symbol.into(),
			decimal_places,
		}
	}

	/// Formats a value as currency: fixed precision, comma-grouped thousands,
	/// currency glyph prefix.
	pub fn currency<'a>(&self, value: impl Into<RawValue<'a>>) -> String {
		let num = safe_number(value, 0.0);
		format!(
			"{}{}",
			self.currency_symbol,
			group_thousands(&to_fixed(num, self.decimal_places))
		)
	}

	/// Formats a value as a percentage with two decimals.
	pub fn percentage<'a>(&self, value: impl Into<RawValue<'a>>) -> String {
		let num = safe_number(value, 0.0);
		format!("{}%", to_fixed(num, PERCENTAGE_DECIMALS))
	}

	/// Reads a number back out of text produced by [`NumberFormat::currency`].
	///
	/// The currency glyph and the grouping commas are stripped before parsing;
	/// unreadable text yields `0.0`.
	pub fn parse_currency(&self, text: &str) -> f64 {
		let cleaned: String = text
			.replace(self.currency_symbol.as_str(), "")
			.chars()
			.filter(|c| *c != ',')
			.collect();
		safe_number(cleaned.as_str(), 0.0)
	}
}

/// Formats a value as currency using the default format.
pub fn format_currency<'a>(value: impl Into<RawValue<'a>>) -> String {
	NumberFormat::default().currency(value)
}

/// Formats a value as a percentage using the default format.
pub fn format_percentage<'a>(value: impl Into<RawValue<'a>>) -> String {
	NumberFormat::default().percentage(value)
}

/// Fixed-point rendering; negative zero prints as zero.
fn to_fixed(num: f64, places: usize) -> String {
	let num = if num == 0.0 { 0.0 } else { num };
	format!("{:.*}", places, num)
}

/// Inserts a comma between every group of three integer digits.
fn group_thousands(fixed: &str) -> String {
	let (sign, unsigned) = match fixed.strip_prefix('-') {
		Some(rest) => ("-", rest),
		None => ("", fixed),
	};
	let (int_part, frac_part) = match unsigned.split_once('.') {
		Some((int_part, frac)) => (int_part, Some(frac)),
		None => (unsigned, None),
	};

	let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
	for (i, digit) in int_part.chars().enumerate() {
		if i > 0 && (int_part.len() - i) % 3 == 0 {
			grouped.push(',');
		}
		grouped.push(digit);
	}

	match frac_part {
		Some(frac) => format!("{sign}{grouped}.{frac}"),
		None => format!("{sign}{grouped}"),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use proptest::prelude::*;
	use rstest::rstest;

	#[rstest]
	#[case::empty("", 0.0)]
	#[case::integer("42", 42.0)]
	#[case::negative("-5", -5.0)]
	#[case::decimal("3.25", 3.25)]
	#[case::leading_dot(".5", 0.5)]
	#[case::leading_whitespace("  7.5", 7.5)]
	#[case::trailing_garbage("12abc", 12.0)]
	#[case::exponent("1e3", 1000.0)]
	#[case::dangling_exponent("2e", 2.0)]
	#[case::plus_sign("+8", 8.0)]
	#[case::letters("abc", 0.0)]
	#[case::infinity("Infinity", 0.0)]
	#[case::lone_sign("-", 0.0)]
	fn test_safe_number_text(#[case] input: &str, #[case] expected: f64) {
		assert_eq!(safe_number(input, 0.0), expected);
	}

	#[rstest]
	fn test_safe_number_uses_default() {
		assert_eq!(safe_number("", 9.0), 9.0);
		assert_eq!(safe_number("n/a", -1.0), -1.0);
		assert_eq!(safe_number(None::<&str>, 3.0), 3.0);
		assert_eq!(safe_number(true, 4.0), 4.0);
	}

	#[rstest]
	fn test_safe_number_rejects_non_finite() {
		assert_eq!(safe_number(f64::NAN, 0.0), 0.0);
		assert_eq!(safe_number(f64::INFINITY, 2.0), 2.0);
		assert_eq!(safe_number("1e400", 0.0), 0.0);
		assert_eq!(safe_number("x", f64::NAN), 0.0);
	}

	#[rstest]
	fn test_safe_number_json_values() {
		assert_eq!(safe_number(&serde_json::json!(null), 1.0), 1.0);
		assert_eq!(safe_number(&serde_json::json!(12.5), 0.0), 12.5);
		assert_eq!(safe_number(&serde_json::json!("99"), 0.0), 99.0);
		assert_eq!(safe_number(&serde_json::json!([1, 2]), 0.0), 0.0);
	}

	#[rstest]
	#[case(1234.5, "₹1,234.50")]
	#[case(0.0, "₹0.00")]
	#[case(999.999, "₹1,000.00")]
	#[case(1_000_000.0, "₹1,000,000.00")]
	#[case(-1234.5, "₹-1,234.50")]
	#[case(12.0, "₹12.00")]
	fn test_format_currency(#[case] input: f64, #[case] expected: &str) {
		assert_eq!(format_currency(input), expected);
	}

	#[rstest]
	fn test_format_currency_empty_and_text() {
		assert_eq!(format_currency(""), "₹0.00");
		assert_eq!(format_currency("not a number"), "₹0.00");
		assert_eq!(format_currency("2500"), "₹2,500.00");
	}

	#[rstest]
	fn test_format_currency_negative_zero() {
		assert_eq!(format_currency(-0.0), "₹0.00");
	}

	#[rstest]
	fn test_custom_currency_format() {
		let format = NumberFormat::new("$", 0);
		assert_eq!(format.currency(1234567.4), "$1,234,567");
	}

	#[rstest]
	#[case(7.0, "7.00%")]
	#[case(12.346, "12.35%")]
	#[case(0.0, "0.00%")]
	fn test_format_percentage(#[case] input: f64, #[case] expected: &str) {
		assert_eq!(format_percentage(input), expected);
	}

	#[rstest]
	fn test_format_percentage_empty() {
		assert_eq!(format_percentage(""), "0.00%");
	}

	#[rstest]
	#[case("₹1,234.50", 1234.5)]
	#[case("₹0.00", 0.0)]
	#[case("₹-2,000.00", -2000.0)]
	#[case("", 0.0)]
	#[case("garbage", 0.0)]
	fn test_parse_currency(#[case] input: &str, #[case] expected: f64) {
		assert_eq!(NumberFormat::default().parse_currency(input), expected);
	}

	proptest! {
		#[test]
		fn prop_safe_number_is_always_finite(s in ".*") {
			prop_assert!(safe_number(s.as_str(), 0.0).is_finite());
		}

		#[test]
		fn prop_safe_number_finite_for_any_float(x in proptest::num::f64::ANY) {
			prop_assert!(safe_number(x, 0.0).is_finite());
		}

		#[test]
		fn prop_currency_round_trips_through_parse(cents in -1_000_000_000i64..1_000_000_000i64) {
			let format = NumberFormat::default();
			let value = cents as f64 / 100.0;
			let text = format.currency(value);
			prop_assert!((format.parse_currency(&text) - value).abs() < 0.005);
		}
	}
}
