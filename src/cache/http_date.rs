//! HTTP-date parsing and formatting (RFC 9110 §5.6.7).

use chrono::{DateTime, NaiveDateTime, Utc};

/// IMF-fixdate, the format every sender must generate.
const IMF_FIXDATE: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Obsolete RFC 850 format with a two-digit year.
const RFC_850: &str = "%A, %d-%b-%y %H:%M:%S GMT";

/// ANSI C `asctime()` format; always GMT.
const ASCTIME: &str = "%a %b %e %H:%M:%S %Y";

/// Parses an HTTP-date into unix seconds.
///
/// Accepts the three formats a recipient must understand, plus RFC 2822 dates
/// with an explicit offset. Returns `None` for anything else.
pub fn parse_http_date(value: &str) -> Option<i64> {
    let value = value.trim();

    for format in [IMF_FIXDATE, RFC_850, ASCTIME] {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed.and_utc().timestamp());
        }
    }

    DateTime::parse_from_rfc2822(value)
        .ok()
        .map(|parsed| parsed.timestamp())
}

/// Formats unix seconds in the RFC 850 form sent in `If-Modified-Since`,
/// e.g. `Thursday, 01-Jan-70 01:18:31 GMT`.
pub fn format_rfc850_date(timestamp: i64) -> String {
    DateTime::<Utc>::from_timestamp(timestamp, 0)
        .unwrap_or_default()
        .format(RFC_850)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUNDAY: i64 = 784_111_777;

    #[test]
    fn parses_imf_fixdate() {
        assert_eq!(parse_http_date("Sun, 06 Nov 1994 08:49:37 GMT"), Some(SUNDAY));
    }

    #[test]
    fn parses_rfc_850() {
        assert_eq!(parse_http_date("Sunday, 06-Nov-94 08:49:37 GMT"), Some(SUNDAY));
    }

    #[test]
    fn parses_rfc_2822_with_offset() {
        assert_eq!(parse_http_date("Sun, 06 Nov 1994 09:49:37 +0100"), Some(SUNDAY));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_http_date("0"), None);
        assert_eq!(parse_http_date("tomorrow"), None);
        assert_eq!(parse_http_date(""), None);
    }

    #[test]
    fn formats_rfc_850() {
        assert_eq!(format_rfc850_date(SUNDAY), "Sunday, 06-Nov-94 08:49:37 GMT");
        assert_eq!(format_rfc850_date(4711), "Thursday, 01-Jan-70 01:18:31 GMT");
    }

    #[test]
    fn formatted_dates_parse_back() {
        for timestamp in [4711, SUNDAY, 1_700_000_000] {
            assert_eq!(parse_http_date(&format_rfc850_date(timestamp)), Some(timestamp));
        }
    }
}
