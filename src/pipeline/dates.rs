use std::sync::LazyLock;

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

static RELATIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,6}|an?)\s+(minute|min|hour|hr|day|week|month)s?\s+ago$").unwrap()
});
static COMPACT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{1,6})\s*(mo|m|h|d|w)$").unwrap());

const CANONICAL_FORMAT: &str = "%Y-%m-%d";

/// Turns an upstream date string into a calendar date. `None` means unknown.
pub trait DateParser: Send + Sync {
    fn parse(&self, text: &str) -> Option<NaiveDate>;
}

/// Render a date the way it is stored on a posting.
pub fn format_date(date: NaiveDate) -> String {
    date.format(CANONICAL_FORMAT).to_string()
}

/// Formats seen across the job feeds. Relative phrases resolve against `now`,
/// which is fixed at construction.
#[derive(Debug, Clone, Copy)]
pub struct FeedDates {
    now: DateTime<Utc>,
}

impl FeedDates {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl DateParser for FeedDates {
    fn parse(&self, text: &str) -> Option<NaiveDate> {
        let t = text.trim();
        if t.is_empty() {
            return None;
        }
        parse_absolute(t)
            .or_else(|| parse_epoch(t))
            .or_else(|| self.parse_relative(&t.to_lowercase()))
    }
}

impl FeedDates {
    fn parse_relative(&self, t: &str) -> Option<NaiveDate> {
        match t {
            "today" | "just now" | "now" => return Some(self.now.date_naive()),
            "yesterday" => return self.back(Duration::days(1)),
            _ => {}
        }

        let (amount, unit) = if let Some(caps) = RELATIVE_RE.captures(t) {
            let n = match &caps[1] {
                "a" | "an" => 1,
                digits => digits.parse::<i64>().ok()?,
            };
            (n, caps[2].to_string())
        } else {
            let caps = COMPACT_RE.captures(t)?;
            (caps[1].parse::<i64>().ok()?, caps[2].to_string())
        };

        let span = match unit.as_str() {
            "m" | "min" | "minute" => Duration::minutes(amount),
            "h" | "hr" | "hour" => Duration::hours(amount),
            "d" | "day" => Duration::days(amount),
            "w" | "week" => Duration::weeks(amount),
            "mo" | "month" => Duration::days(amount * 30),
            _ => return None,
        };
        self.back(span)
    }

    fn back(&self, span: Duration) -> Option<NaiveDate> {
        self.now.checked_sub_signed(span).map(|t| t.date_naive())
    }
}

fn parse_absolute(t: &str) -> Option<NaiveDate> {
    if let Ok(d) = NaiveDate::parse_from_str(t, CANONICAL_FORMAT) {
        return Some(d);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(t) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(t, fmt) {
            return Some(dt.date());
        }
    }
    DateTime::parse_from_rfc2822(t).ok().map(|dt| dt.date_naive())
}

/// 9-10 digits are seconds, 12-13 digits are milliseconds.
fn parse_epoch(t: &str) -> Option<NaiveDate> {
    if !t.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let n: i64 = t.parse().ok()?;
    let secs = match t.len() {
        9 | 10 => n,
        12 | 13 => n / 1000,
        _ => return None,
    };
    DateTime::from_timestamp(secs, 0).map(|dt| dt.date_naive())
}
