//! Date parsing, display formatting, and the index sort order.
//!
//! Frontmatter dates are free text. The accepted shapes are:
//!
//! ```text
//! 2024-03-01                  ISO calendar date (midnight for sorting)
//! 2024/03/01                  slash-separated, as typed by hand
//! 2024-03-01T09:30:00+09:00   RFC 3339 timestamp
//! 2024-03-01 09:30:00 +09:00  YAML timestamp with a space before the offset
//! ```
//!
//! Anything else is kept verbatim for display and sorts as the oldest entry.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};
use std::cmp::Ordering;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
];
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S %:z", "%Y-%m-%d %H:%M:%S %z"];

/// Parse a frontmatter date into a timestamp with its written offset.
///
/// Dates and timestamps without an offset are taken as UTC; a bare date is
/// midnight.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<FixedOffset>> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(s)
        .ok()
        .or_else(|| {
            OFFSET_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(s, fmt).ok())
        })
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .or_else(|| {
                    DATE_FORMATS
                        .iter()
                        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                        .and_then(|date| date.and_hms_opt(0, 0, 0))
                })
                .map(|naive| Utc.from_utc_datetime(&naive).fixed_offset())
        })
}

/// Parse a frontmatter date into the calendar date as written.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    parse_timestamp(raw).map(|ts| ts.date_naive())
}

/// Display form used in page headers and list cards: `YYYY/MM/DD`.
///
/// Unparseable input is returned unchanged, empty input stays empty.
pub fn format_date(raw: &str) -> String {
    match parse_date(raw) {
        Some(date) => date.format("%Y/%m/%d").to_string(),
        None => raw.trim().to_string(),
    }
}

/// Newest-first ordering of two raw date strings.
///
/// Timestamps compare as instants, so posts from the same day keep their
/// time-of-day order. Unparseable dates compare equal to each other and
/// after every valid date, so a stable sort keeps their source order at the
/// tail.
pub fn newest_first(a: &str, b: &str) -> Ordering {
    // None < Some(_), so reversing the operands puts missing dates last
    parse_timestamp(b).cmp(&parse_timestamp(a))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_and_slash_dates() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert_eq!(parse_date("2024-03-01"), expected);
        assert_eq!(parse_date("2024/03/01"), expected);
        assert_eq!(parse_date(" 2024-03-01 "), expected);
    }

    #[test]
    fn parses_timestamps_to_their_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert_eq!(parse_date("2024-03-01T09:30:00+09:00"), expected);
        assert_eq!(parse_date("2024-03-01 09:30"), expected);
        assert_eq!(parse_date("2024-03-01 09:30:00 +09:00"), expected);
        assert_eq!(parse_date("2024-03-01 09:30:00 +0900"), expected);
    }

    #[test]
    fn timestamps_keep_time_and_offset() {
        let ts = parse_timestamp("2024-03-01 10:00:00 +09:00").unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 9 * 3600);
        assert_eq!(ts.to_rfc3339(), "2024-03-01T10:00:00+09:00");

        let midnight = parse_timestamp("2024/03/01").unwrap();
        assert_eq!(midnight.to_rfc3339(), "2024-03-01T00:00:00+00:00");
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("someday"), None);
        assert_eq!(parse_date("2024-13-40"), None);
    }

    #[test]
    fn format_date_uses_slashes() {
        assert_eq!(format_date("2024-03-01"), "2024/03/01");
        assert_eq!(format_date("2024-03-01T00:00:00Z"), "2024/03/01");
    }

    #[test]
    fn format_date_keeps_unparseable_text() {
        assert_eq!(format_date("Spring 2023"), "Spring 2023");
        assert_eq!(format_date(""), "");
    }

    #[test]
    fn newest_first_orders_valid_dates_descending() {
        assert_eq!(newest_first("2024-03-01", "2024-01-01"), Ordering::Less);
        assert_eq!(newest_first("2024-01-01", "2024/03/01"), Ordering::Greater);
        assert_eq!(newest_first("2024-01-01", "2024/01/01"), Ordering::Equal);
    }

    #[test]
    fn newest_first_compares_time_of_day() {
        assert_eq!(
            newest_first("2024-03-01T18:00:00", "2024-03-01T09:00:00"),
            Ordering::Less
        );
        assert_eq!(newest_first("2024-03-01", "2024-03-01 00:00"), Ordering::Equal);
        // 10:00 in Tokyo is 01:00 UTC
        assert_eq!(
            newest_first("2024-03-01 10:00:00 +09:00", "2024-03-01T02:00:00Z"),
            Ordering::Greater
        );
    }

    #[test]
    fn newest_first_puts_missing_dates_last() {
        assert_eq!(newest_first("", "2020-01-01"), Ordering::Greater);
        assert_eq!(newest_first("2020-01-01", "n/a"), Ordering::Less);
        assert_eq!(newest_first("", "n/a"), Ordering::Equal);
    }
}
