#![forbid(unsafe_code)]

use crate::config::AppConfig;
use crate::purge::{self, PurgeOptions};
use clap::Args;
use dk_storage::{RecordStore, StoreError};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

pub fn reindex(store: &RecordStore) -> Result<ExitCode, StoreError> {
    let Some(index) = store.index() else {
        println!("The search index is disabled. Enable it with: daykeep config --set use_index=true");
        return Ok(ExitCode::FAILURE);
    };

    index.ensure_schema()?;
    let mut count = 0usize;
    for record in store.load_all_days()? {
        index.replace_day(&record?)?;
        count += 1;
    }
    println!("Reindexed {count} day file(s).");
    Ok(ExitCode::SUCCESS)
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Change a setting: `--set key=value`.
    #[arg(long)]
    pub set: Option<String>,
    /// Print one setting.
    #[arg(long)]
    pub get: Option<String>,
}

pub fn config_cmd(args: &ConfigArgs, mut config: AppConfig) -> Result<ExitCode, StoreError> {
    if let Some(assignment) = &args.set {
        let Some((key, value)) = assignment.split_once('=') else {
            println!("Use --set key=value");
            return Ok(ExitCode::FAILURE);
        };
        if let Err(message) = config.set(key.trim(), value.trim()) {
            println!("{message}");
            return Ok(ExitCode::FAILURE);
        }
        config.save()?;
        println!("Saved.");
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(key) = &args.get {
        return match config.get(key.trim()) {
            Some(value) => {
                println!("{value}");
                Ok(ExitCode::SUCCESS)
            }
            None => {
                println!("(unknown key)");
                Ok(ExitCode::FAILURE)
            }
        };
    }

    println!(
        "{}",
        serde_json::to_string_pretty(&config).map_err(StoreError::Json)?
    );
    Ok(ExitCode::SUCCESS)
}

#[derive(Args)]
pub struct PurgeArgs {
    /// Skip the confirmation prompt.
    #[arg(short = 'y', long)]
    pub yes: bool,
    /// Only purge the daily JSON files.
    #[arg(long)]
    pub json_only: bool,
    /// Only purge the SQLite index file.
    #[arg(long)]
    pub sqlite_only: bool,
    /// Create a backup zip before deleting.
    #[arg(long)]
    pub backup: bool,
    /// Where to put the backup zip (default: <data-dir>/backups).
    #[arg(long)]
    pub backup_dir: Option<PathBuf>,
}

pub fn purge_cmd(config: &AppConfig, args: &PurgeArgs) -> Result<ExitCode, StoreError> {
    if args.json_only && args.sqlite_only {
        println!("--json-only and --sqlite-only are mutually exclusive.");
        return Ok(ExitCode::FAILURE);
    }

    let options = PurgeOptions {
        data_dir: config.data_dir.clone(),
        purge_json: !args.sqlite_only,
        purge_sqlite: !args.json_only,
        backup: args.backup,
        backup_dir: args.backup_dir.clone(),
    };

    let target = match (options.purge_json, options.purge_sqlite) {
        (true, true) => "all task data (daily JSON files and the SQLite index)",
        (true, false) => "all daily JSON files",
        (false, true) => "the SQLite index",
        (false, false) => "nothing",
    };

    if !args.yes {
        print!(
            "This will permanently delete {target} in {}.{} Continue? [y/N] ",
            options.data_dir.display(),
            if args.backup {
                " A backup zip will be created first."
            } else {
                ""
            }
        );
        std::io::stdout().flush()?;
        let mut answer = String::new();
        std::io::stdin().read_line(&mut answer)?;
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("Purge cancelled.");
            return Ok(ExitCode::SUCCESS);
        }
    }

    let report = purge::run(&options)?;
    if let Some(path) = &report.backup_path {
        println!("Backup written to {}", path.display());
    }
    println!(
        "Purged {} day file(s){}.",
        report.deleted_json,
        if report.deleted_sqlite {
            " and the SQLite index"
        } else {
            ""
        }
    );
    Ok(ExitCode::SUCCESS)
}
