//! HTTP date handling
//!
//! Formats `Last-Modified`/`Expires` values and parses `If-Modified-Since`.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use std::time::SystemTime;

/// Fallback formats tried after RFC 2822, weekday prefix already stripped
/// for the first two
const DATE_FORMATS: [&str; 3] = [
    // RFC 1123: "06 Nov 1994 08:49:37"
    "%d %b %Y %H:%M:%S",
    // RFC 850: "06-Nov-94 08:49:37"
    "%d-%b-%y %H:%M:%S",
    // asctime: "Sun Nov  6 08:49:37 1994"
    "%a %b %e %H:%M:%S %Y",
];

/// Format a timestamp as an IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub fn format_http_date(time: SystemTime) -> String {
    let dt: DateTime<Utc> = time.into();
    dt.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Parse an HTTP date; the weekday name is not checked against the date
///
/// # Examples
/// ```
/// use fileserve::http::date::{parse_http_date, unix_seconds};
///
/// let t = parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT").unwrap();
/// assert_eq!(unix_seconds(t), 784_111_777);
/// assert!(parse_http_date("garbage").is_none());
/// ```
pub fn parse_http_date(value: &str) -> Option<SystemTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc2822(value) {
        return Some(dt.with_timezone(&Utc).into());
    }

    let date = value.split_once(',').map_or(value, |(_, rest)| rest).trim();
    let date = date
        .strip_suffix("GMT")
        .or_else(|| date.strip_suffix("UTC"))
        .unwrap_or(date)
        .trim();

    DATE_FORMATS.iter().find_map(|fmt| {
        NaiveDateTime::parse_from_str(date, fmt)
            .ok()
            .map(|naive| Utc.from_utc_datetime(&naive).into())
    })
}

/// Seconds since the epoch, truncating sub-second precision
pub fn unix_seconds(time: SystemTime) -> i64 {
    DateTime::<Utc>::from(time).timestamp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, UNIX_EPOCH};

    const RFC_EXAMPLE: i64 = 784_111_777;

    #[test]
    fn test_format() {
        let t = UNIX_EPOCH + Duration::from_secs(784_111_777);
        assert_eq!(format_http_date(t), "Sun, 06 Nov 1994 08:49:37 GMT");
        assert_eq!(format_http_date(UNIX_EPOCH), "Thu, 01 Jan 1970 00:00:00 GMT");
    }

    #[test]
    fn test_parse_formats() {
        for value in [
            "Sun, 06 Nov 1994 08:49:37 GMT",
            "Sunday, 06-Nov-94 08:49:37 GMT",
            "Sun Nov  6 08:49:37 1994",
            "Sun, 06 Nov 1994 08:49:37 +0000",
        ] {
            let parsed = parse_http_date(value).unwrap_or_else(|| panic!("failed: {value}"));
            assert_eq!(unix_seconds(parsed), RFC_EXAMPLE, "{value}");
        }
    }

    #[test]
    fn test_weekday_not_validated() {
        // 22 Dec 2030 is a Sunday
        let parsed = parse_http_date("Thu, 22 Dec 2030 01:01:01 GMT").unwrap();
        assert_eq!(format_http_date(parsed), "Sun, 22 Dec 2030 01:01:01 GMT");
    }

    #[test]
    fn test_roundtrip_truncates_subseconds() {
        let t = UNIX_EPOCH + Duration::from_millis(1_700_000_000_750);
        let parsed = parse_http_date(&format_http_date(t)).unwrap();
        assert_eq!(unix_seconds(parsed), 1_700_000_000);
        assert_eq!(unix_seconds(t), 1_700_000_000);
    }

    #[test]
    fn test_parse_garbage() {
        assert!(parse_http_date("garbage").is_none());
        assert!(parse_http_date("").is_none());
        assert!(parse_http_date("Thu, 99 Foo 2030 01:01:01 GMT").is_none());
    }
}
