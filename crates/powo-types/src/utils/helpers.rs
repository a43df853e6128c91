//! Timestamp helpers for the `expires` wire format.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, Utc};

/// Offset-less date-time shapes accepted after RFC 3339. Read as UTC.
const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Renders an instant the way `Date.prototype.toISOString` does
/// (`2099-01-01T00:00:00.000Z`).
pub fn format_timestamp(instant: &DateTime<Utc>) -> String {
	instant.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parses an ISO-8601 timestamp into UTC.
///
/// Accepts RFC 3339, date-times without seconds (`2099-01-01T00:00Z`,
/// `2099-01-01T02:00+02:00`) and bare dates, which mean midnight UTC.
/// Date-times without an offset are read as UTC.
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
	let text = text.trim();
	if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
		return Ok(dt.with_timezone(&Utc));
	}
	if let Ok(dt) = DateTime::parse_from_str(text, "%Y-%m-%dT%H:%M%#z") {
		return Ok(dt.with_timezone(&Utc));
	}

	let naive = text
		.strip_suffix('Z')
		.or_else(|| text.strip_suffix('z'))
		.unwrap_or(text);
	for format in NAIVE_DATE_TIME_FORMATS {
		if let Ok(dt) = NaiveDateTime::parse_from_str(naive, format) {
			return Ok(dt.and_utc());
		}
	}

	NaiveDate::parse_from_str(text, "%Y-%m-%d").map(|date| date.and_time(NaiveTime::MIN).and_utc())
}
