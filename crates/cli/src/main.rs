#![forbid(unsafe_code)]

mod commands;
mod config;
mod git;
mod purge;

use clap::{Parser, Subcommand};
use config::AppConfig;
use dk_core::dates::{self, DayDate};
use dk_storage::{CommitNotifier, NullNotifier, RecordStore, RollForward, StoreConfig, StoreError};
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "daykeep", version, about = "Personal daily task tracker")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Add a new task.
    #[command(visible_alias = "a")]
    Add(commands::AddArgs),
    /// List tasks for a day.
    #[command(visible_alias = "ls")]
    List(commands::ListArgs),
    /// Change a task's status.
    #[command(visible_alias = "st")]
    Status(commands::StatusArgs),
    /// Edit a task's description or tags.
    #[command(visible_alias = "e")]
    Edit(commands::EditArgs),
    /// Set or append to a task's note.
    #[command(visible_alias = "n")]
    Note(commands::NoteArgs),
    /// Archive a task.
    Archive(commands::IdArg),
    /// Reopen a task and clear its completion.
    #[command(visible_alias = "ro")]
    Reopen(commands::IdArg),
    /// Remove a task from today's record only.
    #[command(visible_alias = "del")]
    Remove(commands::IdArg),
    /// Search tasks across all days.
    #[command(visible_alias = "s")]
    Search(commands::SearchArgs),
    /// Standup summary: yesterday's activity, today's open tasks.
    #[command(visible_alias = "su")]
    Standup(commands::StandupArgs),
    /// Rebuild the search index from the day files.
    #[command(visible_alias = "ri")]
    Reindex,
    /// Show or change configuration.
    #[command(visible_alias = "c")]
    Config(commands::ConfigArgs),
    /// Delete local task data, optionally backing it up first.
    #[command(visible_alias = "p")]
    Purge(commands::PurgeArgs),
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let config = AppConfig::load();

    match run(cli, config) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, config: AppConfig) -> Result<ExitCode, StoreError> {
    let offset = dates::local_offset();
    let today = DayDate::today(offset);

    let notifier: Box<dyn CommitNotifier> = if config.git_auto_commit {
        Box::new(git::GitAutoCommit::new(config.data_dir.clone()))
    } else {
        Box::new(NullNotifier)
    };
    let store = RecordStore::open(
        StoreConfig {
            data_dir: config.data_dir.clone(),
            timezone: config.timezone.clone(),
            use_index: config.use_index,
        },
        notifier,
    )?;

    if let Err(err) = RollForward::new(&store, offset).run_if_needed(&today) {
        // config and purge are the recovery paths for a corrupt data
        // directory; everything else must not run against a day that
        // failed to roll forward.
        match &cli.command {
            Command::Config(_) | Command::Purge(_) => eprintln!("warning: {err}"),
            _ => return Err(err),
        }
    }

    match cli.command {
        Command::Add(args) => commands::add(&store, &today, &args),
        Command::List(args) => commands::list(&store, &today, &args),
        Command::Status(args) => commands::status(&store, &today, &args),
        Command::Edit(args) => commands::edit(&store, &today, &args),
        Command::Note(args) => commands::note(&store, &today, &args),
        Command::Archive(args) => commands::archive(&store, &today, &args),
        Command::Reopen(args) => commands::reopen(&store, &today, &args),
        Command::Remove(args) => commands::remove(&store, &today, &args),
        Command::Search(args) => commands::search(&store, &today, &args),
        Command::Standup(args) => commands::standup(&store, &today, offset, &args),
        Command::Reindex => commands::reindex(&store),
        Command::Config(args) => commands::config_cmd(&args, config),
        Command::Purge(args) => commands::purge_cmd(&config, &args),
    }
}
