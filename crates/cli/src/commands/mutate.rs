#![forbid(unsafe_code)]

use super::not_found;
use clap::Args;
use dk_core::dates::DayDate;
use dk_core::model::{now_ms, TaskStatus};
use dk_storage::{RecordStore, StoreError};
use std::process::ExitCode;

#[derive(Args)]
pub struct StatusArgs {
    pub id: String,
    /// One of: todo, in-progress, blocked, skipped, complete.
    pub status: String,
}

#[derive(Args)]
pub struct EditArgs {
    pub id: String,
    /// Replace the description.
    #[arg(long)]
    pub desc: Option<String>,
    /// Comma-separated tags to add.
    #[arg(long)]
    pub add_tag: Option<String>,
    /// Comma-separated tags to remove.
    #[arg(long)]
    pub remove_tag: Option<String>,
}

#[derive(Args)]
pub struct NoteArgs {
    pub id: String,
    /// Replace the note.
    #[arg(long)]
    pub set: Option<String>,
    /// Append a line to the note.
    #[arg(long)]
    pub append: Option<String>,
}

#[derive(Args)]
pub struct IdArg {
    pub id: String,
}

pub fn status(
    store: &RecordStore,
    today: &DayDate,
    args: &StatusArgs,
) -> Result<ExitCode, StoreError> {
    let Some(new_status) = TaskStatus::parse(&args.status) else {
        println!("Invalid status. Use: todo, in-progress, blocked, skipped, complete");
        return Ok(ExitCode::FAILURE);
    };

    let mut record = store.load_day(today)?;
    let Some(task) = record.find_task_mut(&args.id) else {
        return not_found(&args.id);
    };

    let old = task.status;
    task.set_status(new_status, today, now_ms());
    let id = task.id.clone();

    store.save_day(&record, &format!("status {id} {old}->{new_status}"))?;
    println!("Status {id}: {old} -> {new_status}");
    Ok(ExitCode::SUCCESS)
}

pub fn edit(store: &RecordStore, today: &DayDate, args: &EditArgs) -> Result<ExitCode, StoreError> {
    if args.desc.is_none() && args.add_tag.is_none() && args.remove_tag.is_none() {
        println!("Provide at least one of --desc, --add-tag, --remove-tag");
        return Ok(ExitCode::FAILURE);
    }

    let mut record = store.load_day(today)?;
    let Some(task) = record.find_task_mut(&args.id) else {
        return not_found(&args.id);
    };

    let add: Vec<String> = args
        .add_tag
        .as_deref()
        .map(dk_core::tags::parse_csv)
        .unwrap_or_default();
    let remove: Vec<String> = args
        .remove_tag
        .as_deref()
        .map(dk_core::tags::parse_csv)
        .unwrap_or_default();
    task.apply_edit(args.desc.as_deref(), &add, &remove, now_ms());
    let id = task.id.clone();

    store.save_day(&record, &format!("edit {id}"))?;
    println!("Edited {id}");
    Ok(ExitCode::SUCCESS)
}

pub fn note(store: &RecordStore, today: &DayDate, args: &NoteArgs) -> Result<ExitCode, StoreError> {
    let mut record = store.load_day(today)?;
    let Some(task) = record.find_task_mut(&args.id) else {
        return not_found(&args.id);
    };

    if let Some(text) = &args.set {
        task.set_note(text.clone(), now_ms());
    } else if let Some(text) = &args.append {
        task.append_note(text, now_ms());
    } else {
        println!("Provide one of --set or --append");
        return Ok(ExitCode::FAILURE);
    }
    let id = task.id.clone();

    store.save_day(&record, &format!("note {id}"))?;
    println!("Updated note for {id}");
    Ok(ExitCode::SUCCESS)
}

pub fn archive(store: &RecordStore, today: &DayDate, args: &IdArg) -> Result<ExitCode, StoreError> {
    let mut record = store.load_day(today)?;
    let Some(task) = record.find_task_mut(&args.id) else {
        return not_found(&args.id);
    };

    task.archive(now_ms());
    let id = task.id.clone();
    let description = task.description.clone();

    store.save_day(&record, &format!("archive {id}"))?;
    println!("Archived {id}: {description}");
    Ok(ExitCode::SUCCESS)
}

pub fn reopen(store: &RecordStore, today: &DayDate, args: &IdArg) -> Result<ExitCode, StoreError> {
    let mut record = store.load_day(today)?;
    let Some(task) = record.find_task_mut(&args.id) else {
        return not_found(&args.id);
    };

    task.reopen(now_ms());
    let id = task.id.clone();

    store.save_day(&record, &format!("reopen {id}"))?;
    println!("Reopened {id}");
    Ok(ExitCode::SUCCESS)
}

pub fn remove(store: &RecordStore, today: &DayDate, args: &IdArg) -> Result<ExitCode, StoreError> {
    let mut record = store.load_day(today)?;
    let Some(task) = record.remove_task(&args.id) else {
        return not_found(&args.id);
    };

    store.save_day(&record, &format!("remove {}", task.id))?;
    println!("Removed {}: {} (from {} only)", task.id, task.description, today);
    Ok(ExitCode::SUCCESS)
}
