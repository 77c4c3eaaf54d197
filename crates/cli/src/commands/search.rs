#![forbid(unsafe_code)]

use super::{clip, format_tags, parse_day};
use clap::Args;
use dk_core::dates::DayDate;
use dk_core::model::TaskStatus;
use dk_core::tags;
use dk_storage::{RecordStore, SearchEngine, SearchRequest, StoreError};
use std::process::ExitCode;

#[derive(Args)]
pub struct SearchArgs {
    /// Text to look for in descriptions. Empty matches everything.
    pub query: Option<String>,
    /// Treat the query as a case-insensitive regular expression.
    #[arg(long)]
    pub regex: bool,
    /// Approximate matching (edit-distance similarity >= 70).
    #[arg(long)]
    pub fuzzy: bool,
    /// Comma-separated tags; every one must be present.
    #[arg(short = 't', long)]
    pub tag: Option<String>,
    /// Comma-separated statuses to include.
    #[arg(long)]
    pub status: Option<String>,
    /// Earliest day to include (`YYYY-MM-DD`).
    #[arg(long)]
    pub from: Option<String>,
    /// Latest day to include (`YYYY-MM-DD`).
    #[arg(long)]
    pub to: Option<String>,
    /// Emit JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

pub fn search(
    store: &RecordStore,
    today: &DayDate,
    args: &SearchArgs,
) -> Result<ExitCode, StoreError> {
    let statuses: Vec<TaskStatus> = args
        .status
        .as_deref()
        .map(|raw| raw.split(',').filter_map(TaskStatus::parse).collect())
        .unwrap_or_default();

    let from = args
        .from
        .as_deref()
        .map(|value| parse_day(value, today))
        .transpose()?;
    let to = args
        .to
        .as_deref()
        .map(|value| parse_day(value, today))
        .transpose()?;

    let request = SearchRequest {
        query: args.query.clone(),
        use_regex: args.regex,
        use_fuzzy: args.fuzzy,
        tags: args.tag.as_deref().map(tags::parse_csv).unwrap_or_default(),
        statuses,
        from,
        to,
    };

    let results = SearchEngine::new(store).search(request)?;

    if args.json {
        let mut out = Vec::new();
        for hit in results {
            let (date, task) = hit?;
            out.push(serde_json::json!({ "date": date.as_str(), "task": task }));
        }
        println!(
            "{}",
            serde_json::to_string_pretty(&out).map_err(StoreError::Json)?
        );
        return Ok(ExitCode::SUCCESS);
    }

    let mut count = 0usize;
    println!(
        "{:<12} {:<6} {:<12} {:<44} TAGS",
        "DATE", "ID", "STATUS", "DESCRIPTION"
    );
    for hit in results {
        let (date, task) = hit?;
        println!(
            "{:<12} {:<6} {:<12} {:<44} {}",
            date,
            task.id,
            task.status,
            clip(&task.description, 42),
            format_tags(&task.tags),
        );
        count += 1;
    }
    println!("{count} result(s)");
    Ok(ExitCode::SUCCESS)
}
