use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Utc};

/// Whether `date_format` is `"relative"` or a strftime pattern chrono accepts.
pub(crate) fn is_valid_date_format(date_format: &str) -> bool {
    date_format.is_empty()
        || date_format == "relative"
        || !StrftimeItems::new(date_format).any(|item| matches!(item, Item::Error))
}

/// Format a datetime according to the configured date format.
///
/// If `date_format` is `"relative"` (or empty/default), displays relative
/// times like `"Just now"`, `"5m ago"`, `"3h ago"`, falling back to the date
/// after a day. Otherwise, uses `strftime`-style formatting.
pub(crate) fn format_date(dt: &DateTime<Utc>, date_format: &str) -> String {
    if date_format.is_empty() || date_format == "relative" {
        format_relative_time(dt, Utc::now())
    } else {
        let mut out = String::new();
        // chrono reports bad specifiers as a fmt error; fall back to the date.
        if write!(out, "{}", dt.format(date_format)).is_err() {
            return dt.format("%Y-%m-%d").to_string();
        }
        out
    }
}

/// Format a datetime relative to `now`.
fn format_relative_time(dt: &DateTime<Utc>, now: DateTime<Utc>) -> String {
    let duration = now.signed_duration_since(dt);

    let minutes = duration.num_minutes();
    if minutes < 1 {
        return "Just now".to_owned();
    }
    if minutes < 60 {
        return format!("{minutes}m ago");
    }

    let hours = duration.num_hours();
    if hours < 24 {
        return format!("{hours}h ago");
    }

    dt.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn under_a_minute_is_just_now() {
        let dt = now() - Duration::seconds(59);
        assert_eq!(format_relative_time(&dt, now()), "Just now");
    }

    #[test]
    fn future_timestamps_are_just_now() {
        let dt = now() + Duration::minutes(5);
        assert_eq!(format_relative_time(&dt, now()), "Just now");
    }

    #[test]
    fn minutes_and_hours() {
        assert_eq!(
            format_relative_time(&(now() - Duration::minutes(5)), now()),
            "5m ago"
        );
        assert_eq!(
            format_relative_time(&(now() - Duration::minutes(59)), now()),
            "59m ago"
        );
        assert_eq!(
            format_relative_time(&(now() - Duration::hours(3)), now()),
            "3h ago"
        );
    }

    #[test]
    fn older_than_a_day_shows_date() {
        let dt = now() - Duration::days(2);
        assert_eq!(format_relative_time(&dt, now()), "2025-03-08");
    }

    #[test]
    fn invalid_format_falls_back_to_date() {
        let dt = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_date(&dt, "%Q"), "2025-01-02");
    }

    #[test]
    fn date_format_validation() {
        assert!(is_valid_date_format("relative"));
        assert!(is_valid_date_format(""));
        assert!(is_valid_date_format("%d/%m/%Y %H:%M"));
        assert!(!is_valid_date_format("%Q"));
        assert!(!is_valid_date_format("%Y-%"));
    }

    #[test]
    fn custom_format_is_used_verbatim() {
        let dt = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_date(&dt, "%d/%m/%Y"), "02/01/2025");
    }
}
