#![forbid(unsafe_code)]

use dk_core::dates::DayDate;
use dk_storage::CommitNotifier;
use std::path::PathBuf;
use std::process::{Command, Stdio};

/// Commits the data directory after every save. All failures are swallowed
/// and logged; version control is a convenience, never a gate on writes.
pub struct GitAutoCommit {
    data_dir: PathBuf,
}

impl GitAutoCommit {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    fn commit_all(&self, message: &str) -> std::io::Result<()> {
        if !self.data_dir.join(".git").is_dir() {
            self.run(&["init"])?;
        }
        self.run(&["add", "-A"])?;
        // Exits non-zero when there is nothing to commit; that is fine.
        self.run(&["commit", "-m", message])?;
        Ok(())
    }

    fn run(&self, args: &[&str]) -> std::io::Result<()> {
        let status = Command::new("git")
            .args(args)
            .current_dir(&self.data_dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()?;
        if !status.success() {
            log::debug!("git {args:?} exited with {status}");
        }
        Ok(())
    }
}

impl CommitNotifier for GitAutoCommit {
    fn saved(&self, date: &DayDate, change: &str) {
        let message = format!("chore: {change} ({date})");
        if let Err(err) = self.commit_all(&message) {
            log::warn!("git auto-commit failed in {}: {err}", self.data_dir.display());
        }
    }
}
