//! Countdown math for the save-the-date section.
//!
//! The ceremony date and time are configured as display strings
//! ("December 21, 2025", "3:00 PM, PH Time") and interpreted as Philippine
//! wall-clock time, a fixed UTC+8 with no DST.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use log::warn;
use serde::Serialize;

const PH_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// Remaining time to the ceremony, split the way the page displays it.
/// Never negative.
#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeLeft {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeLeft {
    pub const ZERO: TimeLeft = TimeLeft {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };
}

/// The date string decomposed for the save-the-date card, with the
/// day zero-padded to two digits.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct DateParts {
    pub month: String,
    pub day: String,
    pub year: String,
}

/// Parses "Month D, YYYY" plus "H:MM AM|PM[, annotation]" into the UTC
/// instant of the ceremony. Anything after a comma in the time string is a
/// human-facing annotation ("PH Time") and is ignored.
pub fn parse_target(date: &str, time: &str) -> Option<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(date.trim(), "%B %d, %Y").ok()?;
    let clock = time.split(',').next().unwrap_or_default().trim();
    let clock = NaiveTime::parse_from_str(clock, "%I:%M %p").ok()?;
    let offset = FixedOffset::east_opt(PH_UTC_OFFSET_SECS)?;
    offset
        .from_local_datetime(&date.and_time(clock))
        .single()
        .map(|t| t.with_timezone(&Utc))
}

/// Target instant for the countdown. Falls back to a fixed default when the
/// configured strings do not parse, with a warning in the log.
pub fn target_or_default(date: &str, time: &str) -> DateTime<Utc> {
    parse_target(date, time).unwrap_or_else(|| {
        warn!("ceremony date {date:?} / time {time:?} did not parse, counting down to the default target");
        default_target()
    })
}

fn default_target() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 23, 8, 0, 0).unwrap()
}

/// Whole seconds remaining, split into days/hours/minutes/seconds. At or
/// after the target every field is zero.
pub fn time_left(target: DateTime<Utc>, now: DateTime<Utc>) -> TimeLeft {
    let diff = (target - now).num_seconds();
    if diff <= 0 {
        return TimeLeft::ZERO;
    }
    TimeLeft {
        days: diff / 86_400,
        hours: diff / 3_600 % 24,
        minutes: diff / 60 % 60,
        seconds: diff % 60,
    }
}

/// Splits the configured date string for display. Missing pieces take the
/// same defaults the fallback target uses.
pub fn date_parts(date: &str) -> DateParts {
    let mut words = date.split_whitespace();
    let month = words.next().unwrap_or("January").to_string();
    let day: String = words
        .next()
        .unwrap_or("23")
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();
    let day = if day.is_empty() { "23".to_string() } else { day };
    let year = words.next().unwrap_or("2026").to_string();
    DateParts {
        month,
        day: format!("{day:0>2}"),
        year,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn parses_ceremony_strings() {
        // 3:00 PM at UTC+8 is 07:00 UTC
        let target = parse_target("December 21, 2025", "3:00 PM, PH Time").unwrap();
        assert_eq!(target, Utc.with_ymd_and_hms(2025, 12, 21, 7, 0, 0).unwrap());
    }

    #[test]
    fn parses_without_annotation() {
        let target = parse_target("January 23, 2026", "10:30 AM").unwrap();
        assert_eq!(target, Utc.with_ymd_and_hms(2026, 1, 23, 2, 30, 0).unwrap());
    }

    #[test]
    fn bad_strings_fall_back_to_default() {
        assert_eq!(parse_target("someday", "3:00 PM"), None);
        assert_eq!(parse_target("December 21, 2025", "soonish"), None);
        assert_eq!(
            target_or_default("someday", "soonish"),
            Utc.with_ymd_and_hms(2026, 1, 23, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn splits_remaining_time() {
        let target = Utc.with_ymd_and_hms(2025, 12, 21, 7, 0, 0).unwrap();
        let now = target - Duration::days(3) - Duration::hours(4) - Duration::minutes(5) - Duration::seconds(6);
        assert_eq!(
            time_left(target, now),
            TimeLeft { days: 3, hours: 4, minutes: 5, seconds: 6 }
        );
    }

    #[test]
    fn clamps_at_and_after_target() {
        let target = Utc.with_ymd_and_hms(2025, 12, 21, 7, 0, 0).unwrap();
        assert_eq!(time_left(target, target), TimeLeft::ZERO);
        assert_eq!(time_left(target, target + Duration::days(40)), TimeLeft::ZERO);
    }

    #[test]
    fn sub_second_boundary() {
        let target = Utc.with_ymd_and_hms(2025, 12, 21, 7, 0, 0).unwrap();
        let now = target - Duration::seconds(1);
        assert_eq!(
            time_left(target, now),
            TimeLeft { days: 0, hours: 0, minutes: 0, seconds: 1 }
        );
    }

    #[test]
    fn date_parts_from_config_string() {
        assert_eq!(
            date_parts("December 21, 2025"),
            DateParts {
                month: "December".to_string(),
                day: "21".to_string(),
                year: "2025".to_string(),
            }
        );
    }

    #[test]
    fn date_parts_pad_and_default() {
        assert_eq!(date_parts("June 3, 2026").day, "03");
        assert_eq!(
            date_parts(""),
            DateParts {
                month: "January".to_string(),
                day: "23".to_string(),
                year: "2026".to_string(),
            }
        );
    }
}
