#![forbid(unsafe_code)]

use dk_core::dates::DayDate;
use dk_storage::INDEX_FILE_NAME;
use std::io;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use zip::write::{FileOptions, ZipWriter};

pub struct PurgeOptions {
    pub data_dir: PathBuf,
    pub purge_json: bool,
    pub purge_sqlite: bool,
    pub backup: bool,
    pub backup_dir: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct PurgeReport {
    pub backup_path: Option<PathBuf>,
    pub deleted_json: usize,
    pub deleted_sqlite: bool,
}

/// Delete day files and/or the index database. Only files daykeep owns are
/// touched: day files must match the exact date pattern, and the index is
/// addressed by its fixed name (plus SQLite WAL sidecars).
pub fn run(options: &PurgeOptions) -> io::Result<PurgeReport> {
    let mut report = PurgeReport::default();
    if !options.data_dir.is_dir() {
        return Ok(report);
    }

    if options.backup {
        report.backup_path = create_backup_zip(options)?;
    }

    if options.purge_json {
        for path in day_files(&options.data_dir)? {
            std::fs::remove_file(path)?;
            report.deleted_json += 1;
        }
    }

    if options.purge_sqlite {
        let db = options.data_dir.join(INDEX_FILE_NAME);
        if db.is_file() {
            std::fs::remove_file(&db)?;
            report.deleted_sqlite = true;
        }
        for sidecar in ["-wal", "-shm"] {
            let path = options.data_dir.join(format!("{INDEX_FILE_NAME}{sidecar}"));
            if path.is_file() {
                std::fs::remove_file(path)?;
            }
        }
    }

    Ok(report)
}

fn day_files(data_dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in std::fs::read_dir(data_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(stem) = name.strip_suffix(".json") else {
            continue;
        };
        if DayDate::try_new(stem).is_ok() {
            out.push(entry.path());
        }
    }
    out.sort();
    Ok(out)
}

/// Timestamped zip of everything about to be deleted. Returns `None` when
/// there is nothing to back up, so no empty archives are left around.
fn create_backup_zip(options: &PurgeOptions) -> io::Result<Option<PathBuf>> {
    let mut sources: Vec<PathBuf> = Vec::new();
    if options.purge_json {
        sources.extend(day_files(&options.data_dir)?);
    }
    if options.purge_sqlite {
        let db = options.data_dir.join(INDEX_FILE_NAME);
        if db.is_file() {
            sources.push(db);
        }
    }
    if sources.is_empty() {
        return Ok(None);
    }

    let backup_dir = options
        .backup_dir
        .clone()
        .unwrap_or_else(|| options.data_dir.join("backups"));
    std::fs::create_dir_all(&backup_dir)?;
    let zip_path = backup_dir.join(format!("daykeep-backup-{}.zip", timestamp_slug()));

    let file = std::fs::File::create(&zip_path)?;
    let mut writer = ZipWriter::new(file);
    let file_options = FileOptions::default();
    for source in sources {
        let Some(name) = source.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        writer
            .start_file(name, file_options)
            .map_err(io::Error::other)?;
        let mut reader = std::fs::File::open(&source)?;
        io::copy(&mut reader, &mut writer)?;
    }
    writer.finish().map_err(io::Error::other)?;

    Ok(Some(zip_path))
}

fn timestamp_slug() -> String {
    let now = OffsetDateTime::now_utc();
    format!(
        "{:04}{:02}{:02}-{:02}{:02}{:02}",
        now.year(),
        u8::from(now.month()),
        now.day(),
        now.hour(),
        now.minute(),
        now.second()
    )
}
