use time::{
	Date, OffsetDateTime, PrimitiveDateTime,
	format_description::{BorrowedFormatItem, well_known::Rfc3339},
	macros::format_description,
};

const DATETIME_T: &'static [BorrowedFormatItem<'static>] =
	format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");
const DATETIME_SPACE: &'static [BorrowedFormatItem<'static>] =
	format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
const DATE_ONLY: &'static [BorrowedFormatItem<'static>] =
	format_description!("[year]-[month]-[day]");

/// Parses the publish timestamps that newswire feeds actually emit: RFC 3339
/// with or without a trailing `Z`, a space-separated datetime, or a bare date.
/// Naive forms are assumed to be UTC.
pub fn parse_published(raw: &str) -> Option<OffsetDateTime> {
	let trimmed = raw.trim();

	if trimmed.is_empty() {
		return None;
	}

	if let Ok(parsed) = OffsetDateTime::parse(trimmed, &Rfc3339) {
		return Some(parsed);
	}
	if let Ok(parsed) = PrimitiveDateTime::parse(trimmed, DATETIME_T) {
		return Some(parsed.assume_utc());
	}
	if let Ok(parsed) = PrimitiveDateTime::parse(trimmed, DATETIME_SPACE) {
		return Some(parsed.assume_utc());
	}
	if let Ok(parsed) = Date::parse(trimmed, DATE_ONLY) {
		return Some(parsed.midnight().assume_utc());
	}

	None
}

/// Hours elapsed from `published` to `now`. Negative for future-dated input.
pub fn age_hours(published: OffsetDateTime, now: OffsetDateTime) -> f64 {
	(now - published).as_seconds_f64() / 3_600.0
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use super::*;

	#[test]
	fn parses_common_feed_formats() {
		let expected = datetime!(2026-01-07 12:30:00 UTC);

		assert_eq!(parse_published("2026-01-07T12:30:00Z"), Some(expected));
		assert_eq!(parse_published("2026-01-07T12:30:00"), Some(expected));
		assert_eq!(parse_published("2026-01-07 12:30:00"), Some(expected));
		assert_eq!(parse_published("2026-01-07"), Some(datetime!(2026-01-07 0:00:00 UTC)));
	}

	#[test]
	fn rejects_garbage_and_empty_input() {
		assert_eq!(parse_published(""), None);
		assert_eq!(parse_published("   "), None);
		assert_eq!(parse_published("yesterday"), None);
		assert_eq!(parse_published("07/01/2026"), None);
	}
}
