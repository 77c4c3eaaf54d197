#![forbid(unsafe_code)]

use super::parse_day;
use clap::Args;
use dk_core::dates::DayDate;
use dk_core::model::{now_ms, TaskItem};
use dk_core::{ids, tags};
use dk_storage::{RecordStore, StoreError};
use std::process::ExitCode;

#[derive(Args)]
pub struct AddArgs {
    /// What needs doing.
    pub description: String,
    /// Comma-separated tags.
    #[arg(short = 't', long)]
    pub tag: Option<String>,
    /// Initial note text.
    #[arg(long)]
    pub note: Option<String>,
    /// Add to another day instead of today (`today`, `yesterday`, `YYYY-MM-DD`).
    #[arg(long)]
    pub when: Option<String>,
}

pub fn add(store: &RecordStore, today: &DayDate, args: &AddArgs) -> Result<ExitCode, StoreError> {
    let date = match &args.when {
        Some(value) => parse_day(value, today)?,
        None => today.clone(),
    };
    let mut record = store.load_day(&date)?;

    let raw_tags = args.tag.as_deref().map(tags::parse_csv).unwrap_or_default();
    let task = TaskItem::new(
        ids::short_id(),
        &args.description,
        &raw_tags,
        args.note.clone().unwrap_or_default(),
        date,
        now_ms(),
    );
    let id = task.id.clone();
    let description = task.description.clone();
    record.tasks.push(task);

    store.save_day(&record, &format!("add {id}"))?;
    println!("Added {id}: {description}");
    Ok(ExitCode::SUCCESS)
}
