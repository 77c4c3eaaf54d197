#![forbid(unsafe_code)]

use super::{clip, format_tags, parse_day};
use clap::Args;
use dk_core::dates::DayDate;
use dk_core::model::{TaskItem, TaskStatus};
use dk_storage::{RecordStore, StoreError};
use std::process::ExitCode;

#[derive(Args)]
pub struct ListArgs {
    /// Day to list (`today`, `yesterday`, `YYYY-MM-DD`). Defaults to today.
    #[arg(long)]
    pub day: Option<String>,
    /// Only tasks that are not complete.
    #[arg(long)]
    pub open: bool,
    /// Only completed tasks.
    #[arg(long)]
    pub done: bool,
    /// Everything, regardless of status.
    #[arg(long)]
    pub all: bool,
    /// Only tasks carrying this tag.
    #[arg(short = 't', long)]
    pub tag: Option<String>,
    /// Emit JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

pub fn list(store: &RecordStore, today: &DayDate, args: &ListArgs) -> Result<ExitCode, StoreError> {
    let date = match &args.day {
        Some(value) => parse_day(value, today)?,
        None => today.clone(),
    };
    let record = store.load_day(&date)?;

    let mut tasks: Vec<&TaskItem> = record.tasks.iter().collect();
    if let Some(tag) = &args.tag {
        let tag = tag.trim().to_lowercase();
        tasks.retain(|task| task.has_tag(&tag));
    }
    if !args.all {
        if args.open {
            tasks.retain(|task| task.status != TaskStatus::Complete);
        } else if args.done {
            tasks.retain(|task| task.status == TaskStatus::Complete);
        }
    }
    tasks.sort_by_key(|task| task.created_at_ms);

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&tasks).map_err(StoreError::Json)?
        );
        return Ok(ExitCode::SUCCESS);
    }

    if tasks.is_empty() {
        println!("No tasks for {date}.");
        return Ok(ExitCode::SUCCESS);
    }

    println!(
        "{:<6} {:<12} {:<44} {:<24} NOTE",
        "ID", "STATUS", "DESCRIPTION", "TAGS"
    );
    for task in tasks {
        let note = if task.note.trim().is_empty() {
            "-".to_string()
        } else {
            clip(&task.note, 60)
        };
        println!(
            "{:<6} {:<12} {:<44} {:<24} {note}",
            task.id,
            task.status,
            clip(&task.description, 42),
            format_tags(&task.tags),
        );
    }
    Ok(ExitCode::SUCCESS)
}
