// File: src/datetime.rs
// Purpose: Parse the four datetime-flavoured input formats

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;

/// Which textual shape a datetime-flavoured input declares via its
/// `type` attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatetimeKind {
    /// `YYYY-MM-DDThh:mm`
    DatetimeLocal,
    /// `YYYY-MM`
    Month,
    /// `YYYY-Www`
    Week,
    /// `hh:mm`
    Time,
}

impl DatetimeKind {
    pub fn from_type(type_attr: &str) -> Option<Self> {
        match type_attr.to_ascii_lowercase().as_str() {
            "datetime-local" => Some(Self::DatetimeLocal),
            "month" => Some(Self::Month),
            "week" => Some(Self::Week),
            "time" => Some(Self::Time),
            _ => None,
        }
    }
}

static MONTH_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-(\d{1,2})$").unwrap());
static WEEK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{4})-W(\d{1,2})$").unwrap());

/// Parse a value of the given kind into a full instant, so that min/max
/// comparisons work on parsed values rather than text. Month pins the
/// day to the 1st; time pins the date to the epoch so two times always
/// share a date.
pub fn parse(kind: DatetimeKind, raw: &str) -> Option<NaiveDateTime> {
    match kind {
        DatetimeKind::DatetimeLocal => {
            NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M").ok()
        }
        DatetimeKind::Month => {
            let captures = MONTH_RE.captures(raw)?;
            let year: i32 = captures[1].parse().ok()?;
            let month: u32 = captures[2].parse().ok()?;

            Some(NaiveDate::from_ymd_opt(year, month, 1)?.and_time(NaiveTime::MIN))
        }
        DatetimeKind::Week => {
            let captures = WEEK_RE.captures(raw)?;
            let year: i32 = captures[1].parse().ok()?;
            let week: i64 = captures[2].parse().ok()?;

            // Date libraries don't parse week strings; resolve by hand:
            // the first Monday of the year, advanced by `week` whole weeks.
            let jan_first = NaiveDate::from_ymd_opt(year, 1, 1)?;
            let until_monday = (7 - jan_first.weekday().num_days_from_monday()) % 7;
            let first_monday = jan_first + Duration::days(i64::from(until_monday));

            Some((first_monday + Duration::weeks(week)).and_time(NaiveTime::MIN))
        }
        DatetimeKind::Time => NaiveTime::parse_from_str(raw, "%H:%M")
            .ok()
            .map(|time| NaiveDate::default().and_time(time)),
    }
}
