#![forbid(unsafe_code)]

mod add;
mod list;
mod maintenance;
mod mutate;
mod search;
mod standup;

pub use add::{add, AddArgs};
pub use list::{list, ListArgs};
pub use maintenance::{config_cmd, purge_cmd, reindex, ConfigArgs, PurgeArgs};
pub use mutate::{
    archive, edit, note, remove, reopen, status, EditArgs, IdArg, NoteArgs, StatusArgs,
};
pub use search::{search, SearchArgs};
pub use standup::{standup, StandupArgs};

use dk_core::dates::DayDate;
use dk_storage::StoreError;
use std::process::ExitCode;

/// `today`, `yesterday`, or an explicit `YYYY-MM-DD`.
fn parse_day(value: &str, today: &DayDate) -> Result<DayDate, StoreError> {
    match value.trim() {
        "today" => Ok(today.clone()),
        "yesterday" => today
            .previous()
            .ok_or(StoreError::InvalidInput("no day before this one")),
        other => {
            DayDate::try_new(other).map_err(|_| StoreError::InvalidInput("dates must be YYYY-MM-DD"))
        }
    }
}

/// Missing ids are a reported outcome, not an abort: print and fail softly.
fn not_found(id: &str) -> Result<ExitCode, StoreError> {
    println!(
        "{}",
        StoreError::NotFound {
            id: id.to_string()
        }
    );
    Ok(ExitCode::FAILURE)
}

fn clip(text: &str, max_chars: usize) -> String {
    let mut out: String = text.chars().take(max_chars).collect();
    if text.chars().count() > max_chars {
        out.push_str("...");
    }
    out
}

fn format_tags(tags: &[String]) -> String {
    if tags.is_empty() {
        return "-".to_string();
    }
    tags.iter()
        .map(|tag| format!("#{tag}"))
        .collect::<Vec<_>>()
        .join(", ")
}
