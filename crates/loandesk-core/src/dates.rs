//! Calendar helpers for date inputs and period ranges

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Formats accepted in addition to RFC 3339.
const DATETIME_FORMATS: &[&str] = &[
	"%Y-%m-%dT%H:%M:%S%.f",
	"%Y-%m-%dT%H:%M:%S",
	"%Y-%m-%dT%H:%M",
	"%Y-%m-%d %H:%M:%S",
	"%Y-%m-%d %H:%M",
];

/// Parses the value of a date or datetime input.
///
/// Plain dates (`2024-01-31`) resolve to midnight. Zoned timestamps are
/// normalised to UTC. Returns `None` for empty or unreadable text.
pub fn parse_date(value: &str) -> Option<NaiveDateTime> {
	let value = value.trim();
	if value.is_empty() {
		return None;
	}

	if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
		return date.and_hms_opt(0, 0, 0);
	}

	if let Ok(zoned) = DateTime::parse_from_rfc3339(value) {
		return Some(zoned.naive_utc());
	}

	DATETIME_FORMATS
		.iter()
		.find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Whole days between two dates, rounded up and always non-negative.
///
/// Returns `0` when either side is empty or unreadable.
///
/// # Examples
///
/// ```
/// use loandesk_core::dates::calculate_days;
///
/// assert_eq!(calculate_days("2024-01-01", "2024-01-10"), 9);
/// assert_eq!(calculate_days("2024-01-10", "2024-01-01"), 9);
/// assert_eq!(calculate_days("", "2024-01-01"), 0);
/// ```
pub fn calculate_days(from: &str, to: &str) -> i64 {
	let (Some(from), Some(to)) = (parse_date(from), parse_date(to)) else {
		return 0;
	};
	let millis = (to - from).num_milliseconds().unsigned_abs() as f64;
	(millis / MILLIS_PER_DAY).ceil() as i64
}

/// The same calendar day one year later.
///
/// February 29th rolls over to March 1st when the next year is not a leap year.
pub fn one_year_after(date: NaiveDate) -> NaiveDate {
	let year = date.year() + 1;
	NaiveDate::from_ymd_opt(year, date.month(), date.day())
		.or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
		.unwrap_or(date)
}

/// Returns true when `date` lies beyond one year from `today`.
pub fn is_beyond_one_year(date: NaiveDateTime, today: NaiveDate) -> bool {
	one_year_after(today)
		.and_hms_opt(0, 0, 0)
		.is_some_and(|limit| date > limit)
}
