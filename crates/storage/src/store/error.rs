#![forbid(unsafe_code)]

use dk_core::dates::DayDate;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    Json(serde_json::Error),
    InvalidRegex(regex::Error),
    /// A day file exists but cannot be parsed. Never replaced with an empty
    /// record; losing data has to be an explicit user decision.
    CorruptRecord {
        date: DayDate,
        source: serde_json::Error,
    },
    /// The prior day exists but is unreadable while rolling forward. Fatal
    /// for the roll-forward attempt; an empty carry set is never fabricated.
    RollForwardSourceUnreadable {
        date: DayDate,
        detail: String,
    },
    /// A task id that is not present in the addressed day. Non-fatal from
    /// the user's point of view; callers report it and move on.
    NotFound {
        id: String,
    },
    InvalidInput(&'static str),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::Json(err) => write!(f, "json: {err}"),
            Self::InvalidRegex(err) => write!(f, "invalid regex: {err}"),
            Self::CorruptRecord { date, source } => {
                write!(f, "day file for {date} is corrupt: {source}")
            }
            Self::RollForwardSourceUnreadable { date, detail } => {
                write!(f, "cannot roll forward: prior day {date} is unreadable ({detail})")
            }
            Self::NotFound { id } => write!(f, "no task with id {id}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}
