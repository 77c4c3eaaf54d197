#![forbid(unsafe_code)]

use super::requests::IndexQuery;
use super::StoreError;
use dk_core::dates::DayDate;
use dk_core::model::{DayRecord, TaskItem, TaskStatus};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const INDEX_FILE_NAME: &str = "daykeep-index.sqlite";

/// Derived, fully rebuildable projection of all day records. Never
/// authoritative: every row can be reproduced by replaying the day files,
/// and the only write path is a whole-day replace.
pub struct SqliteIndex {
    db_path: PathBuf,
}

/// Flattened projection of one task, keyed by `(date, id)`.
#[derive(Clone, Debug)]
pub struct IndexRow {
    pub date: DayDate,
    pub id: String,
    pub description: String,
    pub tags: Vec<String>,
    pub status: TaskStatus,
    pub archived: bool,
    pub updated_at_ms: i64,
}

impl IndexRow {
    /// Lightweight task reconstruction. Note and history are not stored in
    /// the index and come back empty; callers needing them must read the
    /// day record.
    pub fn into_task(self) -> (DayDate, TaskItem) {
        let task = TaskItem {
            id: self.id,
            description: self.description,
            tags: self.tags,
            status: self.status,
            note: String::new(),
            created_at_ms: self.updated_at_ms,
            updated_at_ms: self.updated_at_ms,
            first_date: self.date.clone(),
            last_date: self.date.clone(),
            archived: self.archived,
            completed_date: None,
            carried_over_from: None,
            history: Vec::new(),
        };
        (self.date, task)
    }
}

impl SqliteIndex {
    pub fn new(db_path: PathBuf) -> Self {
        Self { db_path }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn connect(&self) -> Result<Connection, StoreError> {
        if let Some(parent) = self.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(&self.db_path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        Ok(conn)
    }

    /// Idempotent schema install. The FTS5 side table is best effort: on
    /// SQLite builds without FTS5 the index silently degrades to substring
    /// matching.
    pub fn ensure_schema(&self) -> Result<(), StoreError> {
        let conn = self.connect()?;
        install_schema(&conn)
    }

    /// Atomically replace every row for `record.date` with the record's
    /// current task set. This is the only write path; the index can never
    /// observe a half-updated day.
    pub fn replace_day(&self, record: &DayRecord) -> Result<(), StoreError> {
        let mut conn = self.connect()?;
        install_schema(&conn)?;
        let fts = has_fts(&conn)?;

        let tx = conn.transaction()?;
        tx.execute(
            "DELETE FROM tasks WHERE date = ?1",
            params![record.date.as_str()],
        )?;
        if fts {
            tx.execute(
                "DELETE FROM tasks_fts WHERE date = ?1",
                params![record.date.as_str()],
            )?;
        }

        for task in &record.tasks {
            tx.execute(
                "INSERT INTO tasks(date, id, description, tags, status, archived, updated_at_ms) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    record.date.as_str(),
                    task.id,
                    task.description,
                    task.tags.join(","),
                    task.status.as_str(),
                    i64::from(task.archived),
                    task.updated_at_ms,
                ],
            )?;
            if fts {
                tx.execute(
                    "INSERT INTO tasks_fts(description, tags, id, date) VALUES (?1, ?2, ?3, ?4)",
                    params![
                        task.description,
                        task.tags.join(" "),
                        task.id,
                        record.date.as_str(),
                    ],
                )?;
            }
        }

        tx.commit()?;
        Ok(())
    }

    /// Filtered, ordered rows. With a text query and FTS available this is
    /// a prefix match over description+tags; otherwise a case-insensitive
    /// substring match on description. Ordered by date then id so output is
    /// stable without pagination.
    pub fn query(&self, request: &IndexQuery) -> Result<Vec<IndexRow>, StoreError> {
        let conn = self.connect()?;
        install_schema(&conn)?;

        let mut clauses: Vec<String> = Vec::new();
        let mut clause_params: Vec<String> = Vec::new();

        if let Some(from) = &request.from {
            clauses.push("t.date >= ?".to_string());
            clause_params.push(from.as_str().to_string());
        }
        if let Some(to) = &request.to {
            clauses.push("t.date <= ?".to_string());
            clause_params.push(to.as_str().to_string());
        }
        if !request.statuses.is_empty() {
            let placeholders = vec!["?"; request.statuses.len()].join(",");
            clauses.push(format!("t.status IN ({placeholders})"));
            for status in &request.statuses {
                clause_params.push(status.as_str().to_string());
            }
        }
        for tag in &request.tags {
            clauses.push("(',' || t.tags || ',') LIKE ?".to_string());
            clause_params.push(format!("%,{},%", tag.to_lowercase()));
        }

        let text = request
            .text
            .as_deref()
            .map(str::trim)
            .filter(|text| !text.is_empty());

        const COLUMNS: &str =
            "t.date, t.id, t.description, t.tags, t.status, t.archived, t.updated_at_ms";

        let fts = has_fts(&conn)?;
        let mut params: Vec<String> = Vec::new();
        let sql = match text {
            Some(text) if fts => {
                params.push(fts_prefix_query(text));
                params.extend(clause_params);
                let extra = if clauses.is_empty() {
                    String::new()
                } else {
                    format!(" AND {}", clauses.join(" AND "))
                };
                format!(
                    "SELECT {COLUMNS} FROM tasks t \
                     JOIN tasks_fts f ON f.id = t.id AND f.date = t.date \
                     WHERE tasks_fts MATCH ?{extra} \
                     ORDER BY t.date ASC, t.id ASC"
                )
            }
            Some(text) => {
                clauses.push("t.description LIKE ?".to_string());
                clause_params.push(format!("%{text}%"));
                params.extend(clause_params);
                format!(
                    "SELECT {COLUMNS} FROM tasks t WHERE {} \
                     ORDER BY t.date ASC, t.id ASC",
                    clauses.join(" AND ")
                )
            }
            None => {
                params.extend(clause_params);
                let where_clause = if clauses.is_empty() {
                    String::new()
                } else {
                    format!("WHERE {} ", clauses.join(" AND "))
                };
                format!(
                    "SELECT {COLUMNS} FROM tasks t {where_clause}\
                     ORDER BY t.date ASC, t.id ASC"
                )
            }
        };

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(params.iter()))?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let date: String = row.get(0)?;
            let date = DayDate::try_new(date)
                .map_err(|_| StoreError::InvalidInput("invalid date in index row"))?;
            let tags: String = row.get(3)?;
            let status: String = row.get(4)?;
            out.push(IndexRow {
                date,
                id: row.get(1)?,
                description: row.get(2)?,
                tags: tags
                    .split(',')
                    .filter(|tag| !tag.is_empty())
                    .map(str::to_string)
                    .collect(),
                status: TaskStatus::parse(&status).unwrap_or(TaskStatus::Todo),
                archived: row.get::<_, i64>(5)? != 0,
                updated_at_ms: row.get(6)?,
            });
        }
        Ok(out)
    }
}

fn install_schema(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode=WAL;

        CREATE TABLE IF NOT EXISTS tasks (
          date TEXT NOT NULL,
          id TEXT NOT NULL,
          description TEXT NOT NULL,
          tags TEXT NOT NULL,
          status TEXT NOT NULL,
          archived INTEGER NOT NULL,
          updated_at_ms INTEGER NOT NULL,
          PRIMARY KEY (date, id)
        );

        CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
        CREATE INDEX IF NOT EXISTS idx_tasks_archived ON tasks(archived);
        "#,
    )?;

    // FTS5 may be missing on older builds; queries then fall back to LIKE.
    let _ = conn.execute_batch(
        "CREATE VIRTUAL TABLE IF NOT EXISTS tasks_fts \
         USING fts5(description, tags, id UNINDEXED, date UNINDEXED)",
    );

    Ok(())
}

fn has_fts(conn: &Connection) -> Result<bool, StoreError> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='tasks_fts'",
            [],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some())
}

/// FTS5 prefix query for user text: the whole input as one quoted phrase
/// with a trailing `*`, quotes doubled per FTS5 escaping rules.
fn fts_prefix_query(text: &str) -> String {
    format!("\"{}\"*", text.replace('"', "\"\""))
}
