#![forbid(unsafe_code)]

use crate::dates::{DayDate, UtcOffset};
use crate::tags;
use serde::{Deserialize, Serialize};

/// History operation names, as stored in day files.
pub mod op {
    pub const ADD: &str = "add";
    pub const STATUS: &str = "status";
    pub const EDIT: &str = "edit";
    pub const NOTE: &str = "note";
    pub const ARCHIVE: &str = "archive";
    pub const REOPEN: &str = "reopen";
    pub const REMOVE: &str = "remove";
    pub const ROLLFORWARD: &str = "rollforward";
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Blocked,
    Skipped,
    Complete,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 5] = [
        TaskStatus::Todo,
        TaskStatus::InProgress,
        TaskStatus::Blocked,
        TaskStatus::Skipped,
        TaskStatus::Complete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in-progress",
            TaskStatus::Blocked => "blocked",
            TaskStatus::Skipped => "skipped",
            TaskStatus::Complete => "complete",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "todo" => Some(TaskStatus::Todo),
            // Both spellings are accepted on input; "in-progress" is canonical.
            "in-progress" | "inprogress" => Some(TaskStatus::InProgress),
            "blocked" => Some(TaskStatus::Blocked),
            "skipped" => Some(TaskStatus::Skipped),
            "complete" => Some(TaskStatus::Complete),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only audit entry. Never edited or removed once recorded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEvent {
    pub ts_ms: i64,
    pub op: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<String>,
}

impl HistoryEvent {
    pub fn new(ts_ms: i64, op: &str) -> Self {
        Self {
            ts_ms,
            op: op.to_string(),
            from: None,
            to: None,
            delta: None,
        }
    }

    pub fn transition(ts_ms: i64, op: &str, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            ts_ms,
            op: op.to_string(),
            from: Some(from.into()),
            to: Some(to.into()),
            delta: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskItem {
    pub id: String,
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub note: String,
    pub created_at_ms: i64,
    pub updated_at_ms: i64,
    pub first_date: DayDate,
    pub last_date: DayDate,
    #[serde(default)]
    pub archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_date: Option<DayDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub carried_over_from: Option<DayDate>,
    #[serde(default)]
    pub history: Vec<HistoryEvent>,
}

impl TaskItem {
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        raw_tags: &[String],
        note: impl Into<String>,
        date: DayDate,
        now_ms: i64,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            tags: tags::normalize(raw_tags),
            status: TaskStatus::Todo,
            note: note.into(),
            created_at_ms: now_ms,
            updated_at_ms: now_ms,
            first_date: date.clone(),
            last_date: date,
            archived: false,
            completed_date: None,
            carried_over_from: None,
            history: vec![HistoryEvent::new(now_ms, op::ADD)],
        }
    }

    /// Status change. Entering `complete` stamps the completion day; leaving
    /// it through any path other than `reopen` keeps the stamp.
    pub fn set_status(&mut self, new_status: TaskStatus, today: &DayDate, now_ms: i64) {
        let old = self.status;
        self.status = new_status;
        self.updated_at_ms = now_ms;
        if new_status == TaskStatus::Complete && old != TaskStatus::Complete {
            self.completed_date = Some(today.clone());
        }
        self.history.push(HistoryEvent::transition(
            now_ms,
            op::STATUS,
            old.as_str(),
            new_status.as_str(),
        ));
    }

    pub fn reopen(&mut self, now_ms: i64) {
        let old = self.status;
        self.status = TaskStatus::Todo;
        self.completed_date = None;
        self.updated_at_ms = now_ms;
        self.history.push(HistoryEvent::transition(
            now_ms,
            op::REOPEN,
            old.as_str(),
            TaskStatus::Todo.as_str(),
        ));
    }

    /// Edit description and/or tag set; records a single `edit` event.
    pub fn apply_edit(
        &mut self,
        description: Option<&str>,
        add_tags: &[String],
        remove_tags: &[String],
        now_ms: i64,
    ) {
        if let Some(description) = description {
            self.description = description.to_string();
        }
        if !add_tags.is_empty() {
            let mut merged = self.tags.clone();
            merged.extend(add_tags.iter().cloned());
            self.tags = tags::normalize(&merged);
        }
        if !remove_tags.is_empty() {
            let removed = tags::normalize(remove_tags);
            self.tags.retain(|tag| !removed.contains(tag));
        }
        self.updated_at_ms = now_ms;
        self.history.push(HistoryEvent::new(now_ms, op::EDIT));
    }

    pub fn set_note(&mut self, note: impl Into<String>, now_ms: i64) {
        self.note = note.into();
        self.updated_at_ms = now_ms;
        self.history.push(HistoryEvent::new(now_ms, op::NOTE));
    }

    pub fn append_note(&mut self, text: &str, now_ms: i64) {
        if !self.note.is_empty() && !self.note.ends_with('\n') {
            self.note.push('\n');
        }
        self.note.push_str(text);
        self.updated_at_ms = now_ms;
        self.history.push(HistoryEvent::new(now_ms, op::NOTE));
    }

    pub fn archive(&mut self, now_ms: i64) {
        self.archived = true;
        self.updated_at_ms = now_ms;
        self.history.push(HistoryEvent::new(now_ms, op::ARCHIVE));
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|candidate| candidate == tag)
    }

    /// True when any history event falls on `day` as observed at `offset`.
    pub fn touched_on(&self, day: &DayDate, offset: UtcOffset) -> bool {
        self.history
            .iter()
            .any(|event| DayDate::containing(event.ts_ms, offset).as_ref() == Some(day))
    }

    /// Independent copy for the next day. Identity, content and prior history
    /// are preserved; the copy is re-stamped and gets a `rollforward` event.
    /// The source task is left untouched.
    pub fn carried_copy(&self, prior: &DayDate, today: &DayDate, now_ms: i64) -> Self {
        let mut copy = self.clone();
        copy.updated_at_ms = now_ms;
        copy.last_date = today.clone();
        copy.carried_over_from = Some(prior.clone());
        copy.history.push(HistoryEvent::transition(
            now_ms,
            op::ROLLFORWARD,
            prior.as_str(),
            today.as_str(),
        ));
        copy
    }
}

/// The durable container of all task items for one calendar day. Owns its
/// tasks exclusively; the same task id in another day record is always an
/// independent carried copy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayRecord {
    pub date: DayDate,
    pub timezone: String,
    #[serde(default)]
    pub tasks: Vec<TaskItem>,
}

impl DayRecord {
    pub fn new(date: DayDate, timezone: impl Into<String>) -> Self {
        Self {
            date,
            timezone: timezone.into(),
            tasks: Vec::new(),
        }
    }

    /// Task ids are matched case-insensitively.
    pub fn find_task(&self, id: &str) -> Option<&TaskItem> {
        self.tasks.iter().find(|task| task.id.eq_ignore_ascii_case(id))
    }

    pub fn find_task_mut(&mut self, id: &str) -> Option<&mut TaskItem> {
        self.tasks
            .iter_mut()
            .find(|task| task.id.eq_ignore_ascii_case(id))
    }

    pub fn remove_task(&mut self, id: &str) -> Option<TaskItem> {
        let index = self
            .tasks
            .iter()
            .position(|task| task.id.eq_ignore_ascii_case(id))?;
        Some(self.tasks.remove(index))
    }
}

pub fn now_ms() -> i64 {
    let now = match std::time::SystemTime::now().duration_since(std::time::UNIX_EPOCH) {
        Ok(duration) => duration,
        Err(_) => return 0,
    };
    i64::try_from(now.as_millis()).unwrap_or(i64::MAX)
}
