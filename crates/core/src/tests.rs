use crate::dates::{DayDate, DayDateError, UtcOffset};
use crate::fuzzy::similarity;
use crate::ids::{short_id, SHORT_ID_LEN};
use crate::model::{op, DayRecord, TaskItem, TaskStatus};
use crate::tags;

#[test]
fn day_date_validation() {
    assert!(DayDate::try_new("2025-08-07").is_ok());
    assert!(DayDate::try_new("2024-02-29").is_ok());
    assert_eq!(
        DayDate::try_new("notes").unwrap_err(),
        DayDateError::Pattern
    );
    assert_eq!(
        DayDate::try_new("2025-8-7").unwrap_err(),
        DayDateError::Pattern
    );
    assert_eq!(
        DayDate::try_new("2025-13-40").unwrap_err(),
        DayDateError::Calendar
    );
    assert_eq!(
        DayDate::try_new("2025-02-30").unwrap_err(),
        DayDateError::Calendar
    );
}

#[test]
fn day_date_order_and_arithmetic() {
    let first = DayDate::try_new("2025-03-01").expect("date");
    let second = DayDate::try_new("2025-03-02").expect("date");
    assert!(first < second);
    assert_eq!(second.previous(), Some(first.clone()));
    assert_eq!(
        first.previous().expect("previous").as_str(),
        "2025-02-28"
    );
}

#[test]
fn day_date_containing_buckets_by_offset() {
    let day = DayDate::try_new("2025-06-10").expect("date");
    let start = day.first_instant_ms(UtcOffset::UTC);
    assert_eq!(DayDate::containing(start, UtcOffset::UTC), Some(day.clone()));
    assert_eq!(
        DayDate::containing(start + 23 * 3_600_000, UtcOffset::UTC),
        Some(day.clone())
    );
    assert_eq!(
        DayDate::containing(start - 1, UtcOffset::UTC),
        Some(DayDate::try_new("2025-06-09").expect("date"))
    );
}

#[test]
fn status_parse_round_trip() {
    for status in TaskStatus::ALL {
        assert_eq!(TaskStatus::parse(status.as_str()), Some(status));
    }
    assert_eq!(TaskStatus::parse("inprogress"), Some(TaskStatus::InProgress));
    assert_eq!(TaskStatus::parse("In-Progress"), Some(TaskStatus::InProgress));
    assert_eq!(TaskStatus::parse("done"), None);
}

#[test]
fn normalize_tags_folds_and_dedupes() {
    let out = tags::parse_csv("Work, URGENT , work");
    assert_eq!(out, vec!["urgent".to_string(), "work".to_string()]);

    let empty: Vec<String> = tags::parse_csv(" , ,");
    assert!(empty.is_empty());
}

#[test]
fn short_id_shape() {
    for _ in 0..50 {
        let id = short_id();
        assert_eq!(id.len(), SHORT_ID_LEN);
        assert!(id
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }
}

#[test]
fn fuzzy_similarity_thresholds() {
    assert_eq!(similarity("Buy milk", "buy milk"), 100);
    assert_eq!(similarity("abc", "xyz"), 0);
    assert_eq!(similarity("", ""), 100);
    assert_eq!(similarity("abc", ""), 0);
    // One edit against a ten-character description scores 90.
    assert!(similarity("buy 2 milks", "buy 2 milk") >= 70);
    assert_eq!(similarity("0123456789", "012345678x"), 90);
}

#[test]
fn status_change_stamps_completion_and_reopen_clears_it() {
    let day = DayDate::try_new("2025-05-05").expect("date");
    let mut task = TaskItem::new("ab12", "Ship release", &[], "", day.clone(), 1_000);

    task.set_status(TaskStatus::Complete, &day, 2_000);
    assert_eq!(task.completed_date.as_ref(), Some(&day));
    let event = task.history.last().expect("status event");
    assert_eq!(event.op, op::STATUS);
    assert_eq!(event.from.as_deref(), Some("todo"));
    assert_eq!(event.to.as_deref(), Some("complete"));

    task.reopen(3_000);
    assert_eq!(task.status, TaskStatus::Todo);
    assert!(task.completed_date.is_none());
    assert_eq!(task.history.last().expect("reopen event").op, op::REOPEN);
}

#[test]
fn carried_copy_preserves_identity_and_appends_rollforward() {
    let prior = DayDate::try_new("2025-05-05").expect("date");
    let today = DayDate::try_new("2025-05-06").expect("date");
    let task = TaskItem::new(
        "ab12",
        "Write report",
        &["Work".to_string()],
        "half done",
        prior.clone(),
        1_000,
    );

    let copy = task.carried_copy(&prior, &today, 9_000);
    assert_eq!(copy.id, task.id);
    assert_eq!(copy.description, task.description);
    assert_eq!(copy.created_at_ms, task.created_at_ms);
    assert_eq!(copy.first_date, prior);
    assert_eq!(copy.last_date, today);
    assert_eq!(copy.updated_at_ms, 9_000);
    assert_eq!(copy.carried_over_from.as_ref(), Some(&prior));
    assert_eq!(copy.history.len(), task.history.len() + 1);
    let event = copy.history.last().expect("rollforward event");
    assert_eq!(event.op, op::ROLLFORWARD);
    assert_eq!(event.from.as_deref(), Some(prior.as_str()));
    assert_eq!(event.to.as_deref(), Some(today.as_str()));
    // The source task is untouched.
    assert_eq!(task.history.len(), 1);
}

#[test]
fn day_record_lookup_is_case_insensitive() {
    let date = DayDate::try_new("2025-05-05").expect("date");
    let mut record = DayRecord::new(date.clone(), "+00:00");
    record
        .tasks
        .push(TaskItem::new("aB3d", "Task", &[], "", date, 0));

    assert!(record.find_task("AB3D").is_some());
    assert!(record.find_task("ab3d").is_some());
    assert!(record.find_task("zzzz").is_none());
    assert!(record.remove_task("Ab3D").is_some());
    assert!(record.tasks.is_empty());
}
