//! Calendar-day marker lines and the "current day" context they establish.

use chatty_core::Message;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Offset, TimeZone, Utc};
use regex::Regex;
use std::sync::LazyLock;

static DAY_MARKER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?ix)^
        (?P<heading>\#{1,6}\s+)?
        (?:\*\*)?\s*
        (?:(?:[a-z]+day|mon|tues?|wed|thu(?:rs?)?|fri|sat|sun)\.?,?\s+)?
        (?P<month>jan(?:uary)?|feb(?:ruary)?|mar(?:ch)?|apr(?:il)?|may|june?|july?|aug(?:ust)?|sep(?:t(?:ember)?)?|oct(?:ober)?|nov(?:ember)?|dec(?:ember)?)\.?
        \s+(?P<day>\d{1,2})(?:st|nd|rd|th)?,?
        \s+(?P<year>\d{4})
        \s*(?:\*\*)?\s*$",
    )
    .unwrap()
});

/// How a day marker was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayMarkerStyle {
    /// Under a markdown heading: context only, no message.
    Heading,
    /// Plain line: context plus a structural date-header message.
    Bare,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayMarker {
    pub date: NaiveDate,
    pub style: DayMarkerStyle,
}

impl DayMarker {
    /// Canonical display text, e.g. `December 19, 2025`.
    pub fn label(&self) -> String {
        format_day(self.date)
    }
}

/// Recognize a calendar-date marker line.
pub fn recognize_day_marker(line: &str) -> Option<DayMarker> {
    let caps = DAY_MARKER_RE.captures(line.trim())?;
    let month = month_number(&caps["month"])?;
    let day: u32 = caps["day"].parse().ok()?;
    let year: i32 = caps["year"].parse().ok()?;
    let date = NaiveDate::from_ymd_opt(year, month, day)?;
    let style = if caps.name("heading").is_some() {
        DayMarkerStyle::Heading
    } else {
        DayMarkerStyle::Bare
    };
    Some(DayMarker { date, style })
}

pub fn format_day(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_ascii_lowercase();
    let month = match lower.get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

/// Holds the most recent calendar day seen in a transcript.
#[derive(Debug, Clone)]
pub struct DayTracker {
    current: Option<NaiveDate>,
    offset: FixedOffset,
}

impl DayTracker {
    pub fn new(offset: FixedOffset) -> Self {
        Self {
            current: None,
            offset,
        }
    }

    pub fn current(&self) -> Option<NaiveDate> {
        self.current
    }

    /// Record a marker as the current day. Returns the date-header message
    /// to emit for bare markers; heading markers are context only.
    pub fn enter(&mut self, marker: &DayMarker) -> Option<Message> {
        self.current = Some(marker.date);
        match marker.style {
            DayMarkerStyle::Heading => None,
            DayMarkerStyle::Bare => Some(Message::date_header(
                marker.label(),
                Some(self.midnight(marker.date)),
            )),
        }
    }

    /// Local midnight of `date` at the tracker's default offset.
    pub fn midnight(&self, date: NaiveDate) -> DateTime<FixedOffset> {
        let naive = date.and_time(NaiveTime::MIN);
        self.offset
            .from_local_datetime(&naive)
            .single()
            .unwrap_or_else(|| naive.and_utc().fixed_offset())
    }
}

impl Default for DayTracker {
    fn default() -> Self {
        Self::new(Utc.fix())
    }
}
