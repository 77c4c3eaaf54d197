#![forbid(unsafe_code)]

use super::index::{SqliteIndex, INDEX_FILE_NAME};
use super::{CommitNotifier, StoreConfig, StoreError};
use dk_core::dates::DayDate;
use dk_core::model::DayRecord;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const DAY_FILE_EXT: &str = ".json";

/// The authoritative store: one JSON file per calendar day. The derived
/// index is pushed to on every save but is never consulted for loads.
pub struct RecordStore {
    data_dir: PathBuf,
    timezone: String,
    index: Option<SqliteIndex>,
    notifier: Box<dyn CommitNotifier>,
}

impl RecordStore {
    pub fn open(
        config: StoreConfig,
        notifier: Box<dyn CommitNotifier>,
    ) -> Result<Self, StoreError> {
        std::fs::create_dir_all(&config.data_dir)?;
        let index = config
            .use_index
            .then(|| SqliteIndex::new(config.data_dir.join(INDEX_FILE_NAME)));
        Ok(Self {
            data_dir: config.data_dir,
            timezone: config.timezone,
            index,
            notifier,
        })
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn timezone(&self) -> &str {
        &self.timezone
    }

    pub fn index(&self) -> Option<&SqliteIndex> {
        self.index.as_ref()
    }

    pub fn day_path(&self, date: &DayDate) -> PathBuf {
        self.data_dir.join(format!("{}{DAY_FILE_EXT}", date.as_str()))
    }

    pub fn day_exists(&self, date: &DayDate) -> bool {
        self.day_path(date).is_file()
    }

    /// The stored record for `date`, or a fresh empty record (not persisted)
    /// when no file exists. A file that exists but does not parse is a
    /// `CorruptRecord`.
    pub fn load_day(&self, date: &DayDate) -> Result<DayRecord, StoreError> {
        let raw = match std::fs::read_to_string(self.day_path(date)) {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok(DayRecord::new(date.clone(), self.timezone.clone()));
            }
            Err(err) => return Err(err.into()),
        };
        serde_json::from_str(&raw).map_err(|source| StoreError::CorruptRecord {
            date: date.clone(),
            source,
        })
    }

    /// Whole-file rewrite, last writer wins. After the primary write the
    /// record is pushed into the derived index (best effort; an index
    /// failure never rolls back or blocks the write) and the commit
    /// notifier is informed.
    pub fn save_day(&self, record: &DayRecord, change: &str) -> Result<(), StoreError> {
        std::fs::create_dir_all(&self.data_dir)?;
        let json = serde_json::to_string_pretty(record).map_err(StoreError::Json)?;
        std::fs::write(self.day_path(&record.date), json)?;

        if let Some(index) = &self.index {
            if let Err(err) = index.replace_day(record) {
                log::warn!("index sync failed for {}: {err}", record.date);
            }
        }

        self.notifier.saved(&record.date, change);
        Ok(())
    }

    /// All valid day files, ascending. Filenames must be an exact
    /// `YYYY-MM-DD.json` with a real calendar date; anything else in the
    /// data directory is ignored.
    pub fn enumerate_day_dates(&self) -> Result<Vec<DayDate>, StoreError> {
        let entries = match std::fs::read_dir(&self.data_dir) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };

        let mut out = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Some(stem) = name.strip_suffix(DAY_FILE_EXT) else {
                continue;
            };
            let Ok(date) = DayDate::try_new(stem) else {
                continue;
            };
            out.push(date);
        }
        out.sort();
        Ok(out)
    }

    /// Latest stored day strictly before `before`, with its record.
    pub fn find_most_recent_prior_day(
        &self,
        before: &DayDate,
    ) -> Result<Option<(DayDate, DayRecord)>, StoreError> {
        let prior = self
            .enumerate_day_dates()?
            .into_iter()
            .filter(|date| date < before)
            .next_back();
        match prior {
            None => Ok(None),
            Some(date) => {
                let record = self.load_day(&date)?;
                Ok(Some((date, record)))
            }
        }
    }

    /// All day records, ascending, loaded one at a time.
    pub fn load_all_days(
        &self,
    ) -> Result<impl Iterator<Item = Result<DayRecord, StoreError>> + '_, StoreError> {
        let dates = self.enumerate_day_dates()?;
        Ok(dates.into_iter().map(move |date| self.load_day(&date)))
    }
}
