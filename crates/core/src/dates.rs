#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use time::{Date, Month, OffsetDateTime};

pub use time::UtcOffset;

/// A calendar day in canonical `YYYY-MM-DD` form.
///
/// The canonical string is zero-padded, so lexicographic order on the
/// rendered form equals chronological order. Construction validates both the
/// shape and the calendar (rejects month 13, day 40, Feb 30, ...).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DayDate(String);

impl DayDate {
    pub fn try_new(value: impl Into<String>) -> Result<Self, DayDateError> {
        let value = value.into();
        let (year, month, day) = parse_parts(&value).ok_or(DayDateError::Pattern)?;
        let month = Month::try_from(month).map_err(|_| DayDateError::Calendar)?;
        Date::from_calendar_date(year, month, day).map_err(|_| DayDateError::Calendar)?;
        Ok(Self(value))
    }

    pub fn from_date(date: Date) -> Self {
        Self(format!(
            "{:04}-{:02}-{:02}",
            date.year(),
            u8::from(date.month()),
            date.day()
        ))
    }

    pub fn today(offset: UtcOffset) -> Self {
        Self::from_date(OffsetDateTime::now_utc().to_offset(offset).date())
    }

    /// The calendar day containing a unix-millisecond timestamp, as observed
    /// at the given offset. `None` for timestamps outside the representable
    /// range.
    pub fn containing(ts_ms: i64, offset: UtcOffset) -> Option<Self> {
        let nanos = (ts_ms as i128) * 1_000_000i128;
        let dt = OffsetDateTime::from_unix_timestamp_nanos(nanos).ok()?;
        Some(Self::from_date(dt.to_offset(offset).date()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn to_date(&self) -> Date {
        let (year, month, day) = parse_parts(&self.0).unwrap_or((1970, 1, 1));
        let month = Month::try_from(month).unwrap_or(Month::January);
        Date::from_calendar_date(year, month, day).unwrap_or(Date::MIN)
    }

    pub fn previous(&self) -> Option<Self> {
        self.to_date().previous_day().map(Self::from_date)
    }

    /// Unix milliseconds at which this day begins at the given offset.
    pub fn first_instant_ms(&self, offset: UtcOffset) -> i64 {
        self.to_date()
            .midnight()
            .assume_offset(offset)
            .unix_timestamp()
            .saturating_mul(1000)
    }
}

impl std::fmt::Display for DayDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for DayDate {
    type Error = DayDateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_new(value)
    }
}

impl From<DayDate> for String {
    fn from(value: DayDate) -> Self {
        value.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DayDateError {
    Pattern,
    Calendar,
}

impl std::fmt::Display for DayDateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pattern => write!(f, "date must be YYYY-MM-DD"),
            Self::Calendar => write!(f, "date is not a valid calendar day"),
        }
    }
}

impl std::error::Error for DayDateError {}

fn parse_parts(value: &str) -> Option<(i32, u8, u8)> {
    let bytes = value.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    for (index, byte) in bytes.iter().enumerate() {
        if index == 4 || index == 7 {
            continue;
        }
        if !byte.is_ascii_digit() {
            return None;
        }
    }
    let year = value[0..4].parse::<i32>().ok()?;
    let month = value[5..7].parse::<u8>().ok()?;
    let day = value[8..10].parse::<u8>().ok()?;
    Some((year, month, day))
}

/// Local offset of this process, falling back to UTC when the platform
/// cannot determine one (e.g. multi-threaded environments on some unixes).
pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

/// Informational offset label of the form `+02:00`, stored in day records.
pub fn offset_label(offset: UtcOffset) -> String {
    let seconds = offset.whole_seconds();
    let sign = if seconds < 0 { '-' } else { '+' };
    let abs = seconds.unsigned_abs();
    format!("{}{:02}:{:02}", sign, abs / 3600, (abs % 3600) / 60)
}
