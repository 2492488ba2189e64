//! Timestamp cues found on message-start lines and their resolution to an
//! absolute point in time.
//!
//! Priority per message: an inline absolute timestamp wins; otherwise a
//! clock-time cue is composed with the current day from the day tracker;
//! otherwise the message stays untimestamped and is ordered by position.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};
use regex::Regex;
use std::sync::LazyLock;

/// Regex fragment for an inline absolute timestamp (used by line rules).
pub(crate) const ABSOLUTE_PATTERN: &str = r"\d{4}-\d{2}-\d{2}[T ]\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?(?:\s*(?:Z|[+-]\d{2}:?\d{2}|[A-Za-z]{2,5}))?";

/// Regex fragment for a clock-time cue (used by line rules).
pub(crate) const CLOCK_PATTERN: &str =
    r"\d{1,2}:\d{2}(?::\d{2})?\s*[AaPp]\.?[Mm]\.?(?:\s+[A-Za-z]{2,5})?";

static ABSOLUTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<date>\d{4}-\d{2}-\d{2})[T ](?P<time>\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?)\s*(?P<zone>Z|[+-]\d{2}:?\d{2}|[A-Za-z]{2,5})?$",
    )
    .unwrap()
});

static CLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<h>\d{1,2}):(?P<m>\d{2})(?::(?P<s>\d{2}))?\s*(?P<mer>[AaPp])\.?[Mm]\.?(?:\s+(?P<zone>[A-Za-z]{2,5}))?$",
    )
    .unwrap()
});

/// A timestamp cue captured from a message-start line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampCue {
    /// Full date and time, used as-is.
    Absolute(DateTime<FixedOffset>),
    /// Time of day only; needs the current day to resolve.
    Clock(ClockTime),
}

impl TimestampCue {
    /// Parse cue text as either an absolute timestamp or a clock time.
    pub fn parse(text: &str, default_offset: FixedOffset) -> Option<Self> {
        if let Some(absolute) = parse_absolute(text, default_offset) {
            return Some(Self::Absolute(absolute));
        }
        ClockTime::parse(text).map(Self::Clock)
    }
}

/// 12-hour clock time with an optional zone abbreviation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockTime {
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
    pub pm: bool,
    pub zone: Option<String>,
}

impl ClockTime {
    pub fn parse(text: &str) -> Option<Self> {
        let caps = CLOCK_RE.captures(text.trim())?;
        let hour: u32 = caps["h"].parse().ok()?;
        let minute: u32 = caps["m"].parse().ok()?;
        let second: u32 = match caps.name("s") {
            Some(s) => s.as_str().parse().ok()?,
            None => 0,
        };
        if hour > 12 || minute > 59 || second > 59 {
            return None;
        }
        Some(Self {
            hour,
            minute,
            second,
            pm: caps["mer"].eq_ignore_ascii_case("p"),
            zone: caps.name("zone").map(|z| z.as_str().to_ascii_uppercase()),
        })
    }

    /// 24-hour time: `hour % 12`, plus 12 when PM.
    pub fn to_naive_time(&self) -> Option<NaiveTime> {
        let hour = self.hour % 12 + if self.pm { 12 } else { 0 };
        NaiveTime::from_hms_opt(hour, self.minute, self.second)
    }
}

/// Fixed offset for a timezone abbreviation.
pub fn zone_offset(abbrev: &str) -> Option<FixedOffset> {
    let hours: i32 = match abbrev.to_ascii_uppercase().as_str() {
        "Z" | "UTC" | "GMT" => 0,
        "EST" => -5,
        "EDT" => -4,
        "CST" => -6,
        "CDT" => -5,
        "MST" => -7,
        "MDT" => -6,
        "PST" => -8,
        "PDT" => -7,
        "AKST" => -9,
        "AKDT" => -8,
        "HST" => -10,
        "BST" | "CET" => 1,
        "CEST" => 2,
        "JST" => 9,
        "AEST" => 10,
        "AEDT" => 11,
        "IST" => return FixedOffset::east_opt(5 * 3600 + 30 * 60),
        _ => return None,
    };
    FixedOffset::east_opt(hours * 3600)
}

fn parse_numeric_offset(text: &str) -> Option<FixedOffset> {
    let sign = match text.as_bytes().first()? {
        b'+' => 1,
        b'-' => -1,
        _ => return None,
    };
    let digits: String = text[1..].chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

/// Parse an inline absolute timestamp. RFC 3339 first, then the looser
/// `YYYY-MM-DD HH:MM[:SS] [zone]` shape; a missing or unknown zone uses
/// `default_offset`.
pub fn parse_absolute(text: &str, default_offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    let text = text.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts);
    }

    let caps = ABSOLUTE_RE.captures(text)?;
    let date = NaiveDate::parse_from_str(&caps["date"], "%Y-%m-%d").ok()?;
    let time_str = &caps["time"];
    let time = NaiveTime::parse_from_str(time_str, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(time_str, "%H:%M"))
        .ok()?;
    let offset = match caps.name("zone").map(|z| z.as_str()) {
        Some(zone) if zone.starts_with(['+', '-']) => parse_numeric_offset(zone)?,
        Some(zone) => zone_offset(zone).unwrap_or(default_offset),
        None => default_offset,
    };
    localize(NaiveDateTime::new(date, time), offset)
}

fn localize(naive: NaiveDateTime, offset: FixedOffset) -> Option<DateTime<FixedOffset>> {
    offset.from_local_datetime(&naive).single()
}

/// Resolves cues to absolute timestamps.
#[derive(Debug, Clone, Copy)]
pub struct TimestampResolver {
    default_offset: FixedOffset,
}

impl TimestampResolver {
    pub fn new(default_offset: FixedOffset) -> Self {
        Self { default_offset }
    }

    /// Build from a minute offset, falling back to UTC when out of range.
    pub fn from_offset_minutes(minutes: i32) -> Self {
        let offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .unwrap_or_else(|| {
                tracing::warn!("Ignoring out-of-range UTC offset of {} minutes", minutes);
                Utc.fix()
            });
        Self::new(offset)
    }

    pub fn default_offset(&self) -> FixedOffset {
        self.default_offset
    }

    /// Absolute cues resolve directly; clock cues need `current_day` and
    /// resolve to `None` without it.
    pub fn resolve(
        &self,
        cue: Option<&TimestampCue>,
        current_day: Option<NaiveDate>,
    ) -> Option<DateTime<FixedOffset>> {
        match cue? {
            TimestampCue::Absolute(ts) => Some(*ts),
            TimestampCue::Clock(clock) => {
                let day = current_day?;
                let time = clock.to_naive_time()?;
                let offset = clock
                    .zone
                    .as_deref()
                    .and_then(zone_offset)
                    .unwrap_or(self.default_offset);
                localize(NaiveDateTime::new(day, time), offset)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn test_parse_rfc3339() {
        let ts = parse_absolute("2026-01-20T10:26:07-05:00", utc()).unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-01-20T10:26:07-05:00");
        let ts = parse_absolute("2026-01-20T15:26:07.250Z", utc()).unwrap();
        assert_eq!(ts.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_parse_loose_absolute() {
        let ts = parse_absolute("2025-12-19 14:03:22 UTC", utc()).unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-12-19T14:03:22+00:00");

        let ts = parse_absolute("2025-12-19 09:03 EST", utc()).unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-12-19T09:03:00-05:00");

        let ts = parse_absolute("2025-12-19 09:03:00 +0530", utc()).unwrap();
        assert_eq!(ts.offset().local_minus_utc(), 5 * 3600 + 30 * 60);

        let est = FixedOffset::west_opt(5 * 3600).unwrap();
        let ts = parse_absolute("2025-12-19 09:03:00", est).unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-12-19T09:03:00-05:00");
    }

    #[test]
    fn test_parse_absolute_rejects_garbage() {
        assert!(parse_absolute("yesterday", utc()).is_none());
        assert!(parse_absolute("2025-13-40 10:00", utc()).is_none());
    }

    #[test]
    fn test_clock_time_twelve_hour_conversion() {
        let cases = [
            ("10:26:07 AM", (10, 26, 7)),
            ("10:26 PM", (22, 26, 0)),
            ("12:00:00 AM", (0, 0, 0)),
            ("12:30 pm", (12, 30, 0)),
            ("1:05 p.m.", (13, 5, 0)),
        ];
        for (text, (h, m, s)) in cases {
            let clock = ClockTime::parse(text).unwrap_or_else(|| panic!("{text}"));
            assert_eq!(
                clock.to_naive_time(),
                NaiveTime::from_hms_opt(h, m, s),
                "{text}"
            );
        }
        assert!(ClockTime::parse("13:00 PM").is_none());
        assert!(ClockTime::parse("10:61 AM").is_none());
    }

    #[test]
    fn test_clock_zone_is_captured() {
        let clock = ClockTime::parse("10:26:07 AM est").unwrap();
        assert_eq!(clock.zone.as_deref(), Some("EST"));
    }

    #[test]
    fn test_resolve_clock_with_current_day() {
        let resolver = TimestampResolver::new(utc());
        let cue = TimestampCue::parse("10:26:07 AM EST", utc()).unwrap();
        let day = NaiveDate::from_ymd_opt(2026, 1, 20);

        let ts = resolver.resolve(Some(&cue), day).unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-01-20T10:26:07-05:00");
        assert_eq!(ts.date_naive(), day.unwrap());
    }

    #[test]
    fn test_resolve_clock_without_day_is_unknown() {
        let resolver = TimestampResolver::new(utc());
        let cue = TimestampCue::parse("10:26 AM", utc()).unwrap();
        assert!(resolver.resolve(Some(&cue), None).is_none());
        assert!(resolver.resolve(None, NaiveDate::from_ymd_opt(2026, 1, 20)).is_none());
    }

    #[test]
    fn test_resolve_clock_uses_default_offset() {
        let resolver = TimestampResolver::from_offset_minutes(60);
        let cue = TimestampCue::parse("9:00 AM", resolver.default_offset()).unwrap();
        let ts = resolver
            .resolve(Some(&cue), NaiveDate::from_ymd_opt(2026, 1, 20))
            .unwrap();
        assert_eq!(ts.to_rfc3339(), "2026-01-20T09:00:00+01:00");
    }

    #[test]
    fn test_out_of_range_offset_falls_back_to_utc() {
        for minutes in [i32::MAX, i32::MIN, 50_000_000, 24 * 60] {
            let resolver = TimestampResolver::from_offset_minutes(minutes);
            assert_eq!(resolver.default_offset().local_minus_utc(), 0, "{minutes}");
        }
        let resolver = TimestampResolver::from_offset_minutes(-300);
        assert_eq!(resolver.default_offset().local_minus_utc(), -300 * 60);
    }

    #[test]
    fn test_absolute_ignores_current_day() {
        let resolver = TimestampResolver::new(utc());
        let cue = TimestampCue::parse("2025-12-19T08:00:00Z", utc()).unwrap();
        let ts = resolver
            .resolve(Some(&cue), NaiveDate::from_ymd_opt(2026, 1, 20))
            .unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-12-19T08:00:00+00:00");
    }

    #[test]
    fn test_zone_offsets() {
        assert_eq!(zone_offset("pst").unwrap().local_minus_utc(), -8 * 3600);
        assert_eq!(zone_offset("IST").unwrap().local_minus_utc(), 19800);
        assert!(zone_offset("XYZ").is_none());
    }
}
