//! Date header normalization.

use chrono::DateTime;

/// Output layout for normalized dates, e.g. `2001-05-14 16:39:00 -0700`.
pub const NORMALIZED_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";

/// Normalize an RFC 2822 `Date` header value. Values that do not parse are returned trimmed and
/// otherwise untouched; normalization never rejects a message.
pub fn normalize_date(raw: &str) -> String {
    let trimmed = raw.trim();
    match DateTime::parse_from_rfc2822(strip_zone_comment(trimmed)) {
        Ok(dt) => dt.format(NORMALIZED_DATE_FORMAT).to_string(),
        Err(_) => trimmed.to_string(),
    }
}

/// Drop a trailing comment such as ` (PDT)`.
fn strip_zone_comment(s: &str) -> &str {
    match s.rfind(" (") {
        Some(idx) if s.ends_with(')') => s[..idx].trim_end(),
        _ => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rfc2822_with_comment() {
        assert_eq!(
            normalize_date("Mon, 14 May 2001 16:39:00 -0700 (PDT)"),
            "2001-05-14 16:39:00 -0700"
        );
    }

    #[test]
    fn test_rfc2822_without_weekday() {
        assert_eq!(
            normalize_date("1 Jan 2024 00:00:00 +0000"),
            "2024-01-01 00:00:00 +0000"
        );
    }

    #[test]
    fn test_unparsable_kept_trimmed() {
        assert_eq!(
            normalize_date("  2024-01-01 00:00:00 "),
            "2024-01-01 00:00:00"
        );
    }

    #[test]
    fn test_normalized_is_stable() {
        let once = normalize_date("Tue, 2 Jan 2024 10:11:12 +0100");
        assert_eq!(normalize_date(&once), once);
    }
}
