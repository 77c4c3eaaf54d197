#![forbid(unsafe_code)]

use super::parse_day;
use clap::Args;
use dk_core::dates::{DayDate, UtcOffset};
use dk_core::model::{op, TaskItem, TaskStatus};
use dk_storage::{RecordStore, StoreError};
use std::process::ExitCode;

/// Operations that count as "worked on" for the summary.
const STANDUP_OPS: [&str; 5] = [op::ADD, op::STATUS, op::NOTE, op::EDIT, op::ARCHIVE];

#[derive(Args)]
pub struct StandupArgs {
    /// Day to summarize as "today". Defaults to the current day.
    #[arg(long)]
    pub date: Option<String>,
}

pub fn standup(
    store: &RecordStore,
    today: &DayDate,
    offset: UtcOffset,
    args: &StandupArgs,
) -> Result<ExitCode, StoreError> {
    let date = match &args.date {
        Some(value) => parse_day(value, today)?,
        None => today.clone(),
    };
    let yesterday = date
        .previous()
        .ok_or(StoreError::InvalidInput("no day before this one"))?;

    let today_record = store.load_day(&date)?;
    let yesterday_record = store.load_day(&yesterday)?;

    let worked: Vec<&TaskItem> = yesterday_record
        .tasks
        .iter()
        .filter(|task| {
            task.history.iter().any(|event| {
                STANDUP_OPS.contains(&event.op.as_str())
                    && DayDate::containing(event.ts_ms, offset).as_ref() == Some(&yesterday)
            })
        })
        .collect();
    let open: Vec<&TaskItem> = today_record
        .tasks
        .iter()
        .filter(|task| task.status != TaskStatus::Complete)
        .collect();

    println!("Yesterday:");
    if worked.is_empty() {
        println!("- (none)");
    }
    for task in worked {
        println!("- {}", task.description);
    }
    println!("Today:");
    if open.is_empty() {
        println!("- (none)");
    }
    for task in open {
        println!("- {}", task.description);
    }
    Ok(ExitCode::SUCCESS)
}
