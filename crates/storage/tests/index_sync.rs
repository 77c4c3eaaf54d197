#![forbid(unsafe_code)]

use dk_core::dates::DayDate;
use dk_core::model::{DayRecord, TaskItem};
use dk_storage::{
    IndexQuery, NullNotifier, RecordStore, SqliteIndex, StoreConfig, INDEX_FILE_NAME,
};
use rusqlite::Connection;
use std::path::PathBuf;

fn temp_dir(test_name: &str) -> PathBuf {
    let base = std::env::temp_dir();
    let pid = std::process::id();
    let nonce = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = base.join(format!("dk_storage_{test_name}_{pid}_{nonce}"));
    std::fs::create_dir_all(&dir).expect("create temp dir");
    dir
}

fn open_store(data_dir: PathBuf, use_index: bool) -> RecordStore {
    RecordStore::open(
        StoreConfig {
            data_dir,
            timezone: "+00:00".to_string(),
            use_index,
        },
        Box::new(NullNotifier),
    )
    .expect("open store")
}

fn date(value: &str) -> DayDate {
    DayDate::try_new(value).expect("valid date")
}

fn task(id: &str, description: &str, day: &DayDate, ts: i64) -> TaskItem {
    TaskItem::new(id, description, &[], "", day.clone(), ts)
}

fn row_ids_for_date(data_dir: &std::path::Path, day: &str) -> Vec<String> {
    let conn = Connection::open(data_dir.join(INDEX_FILE_NAME)).expect("open index db");
    let mut stmt = conn
        .prepare("SELECT id FROM tasks WHERE date = ?1 ORDER BY id ASC")
        .expect("prepare");
    let rows = stmt
        .query_map([day], |row| row.get::<_, String>(0))
        .expect("query");
    rows.collect::<Result<Vec<_>, _>>().expect("collect")
}

#[test]
fn save_day_pushes_the_record_into_the_index() {
    let dir = temp_dir("save_day_pushes_the_record_into_the_index");
    let store = open_store(dir.clone(), true);
    let day = date("2025-07-10");

    let mut record = DayRecord::new(day.clone(), "+00:00");
    record.tasks.push(task("aa01", "First", &day, 1_000));
    record.tasks.push(task("bb02", "Second", &day, 2_000));
    store.save_day(&record, "seed").expect("save");

    assert_eq!(row_ids_for_date(&dir, "2025-07-10"), vec!["aa01", "bb02"]);
}

#[test]
fn replace_day_leaves_no_stale_rows() {
    let dir = temp_dir("replace_day_leaves_no_stale_rows");
    let store = open_store(dir.clone(), true);
    let day = date("2025-07-11");

    let mut record = DayRecord::new(day.clone(), "+00:00");
    record.tasks.push(task("aa01", "Keep me", &day, 1_000));
    record.tasks.push(task("bb02", "Drop me", &day, 2_000));
    store.save_day(&record, "seed").expect("save");

    record.remove_task("bb02");
    record.tasks.push(task("cc03", "New arrival", &day, 3_000));
    store.save_day(&record, "mutate").expect("save again");

    assert_eq!(row_ids_for_date(&dir, "2025-07-11"), vec!["aa01", "cc03"]);
}

#[test]
fn disabled_index_skips_all_index_writes() {
    let dir = temp_dir("disabled_index_skips_all_index_writes");
    let store = open_store(dir.clone(), false);
    let day = date("2025-07-12");

    store
        .save_day(&DayRecord::new(day, "+00:00"), "seed")
        .expect("save");

    assert!(store.index().is_none());
    assert!(!dir.join(INDEX_FILE_NAME).exists());
}

#[test]
fn index_write_failure_never_blocks_the_primary_save() {
    let dir = temp_dir("index_write_failure_never_blocks_the_primary_save");
    // A directory squatting on the database path makes every index write
    // fail while the day file path stays healthy.
    std::fs::create_dir_all(dir.join(INDEX_FILE_NAME)).expect("block db path");
    let store = open_store(dir.clone(), true);
    let day = date("2025-07-13");

    let mut record = DayRecord::new(day.clone(), "+00:00");
    record.tasks.push(task("aa01", "Survives", &day, 1_000));
    store.save_day(&record, "seed").expect("save must succeed");

    assert!(dir.join("2025-07-13.json").is_file());
    assert_eq!(store.load_day(&day).expect("reload"), record);
}

#[test]
fn index_is_rebuildable_by_replaying_day_files() {
    let dir = temp_dir("index_is_rebuildable_by_replaying_day_files");
    // Write days without an index, then rebuild one from scratch.
    let store = open_store(dir.clone(), false);
    for (value, id) in [("2025-07-01", "aa01"), ("2025-07-02", "bb02")] {
        let day = date(value);
        let mut record = DayRecord::new(day.clone(), "+00:00");
        record.tasks.push(task(id, "Some work", &day, 1_000));
        store.save_day(&record, "seed").expect("save");
    }

    let index = SqliteIndex::new(dir.join(INDEX_FILE_NAME));
    index.ensure_schema().expect("schema");
    let mut replayed = 0usize;
    for record in store.load_all_days().expect("enumerate") {
        index.replace_day(&record.expect("load")).expect("replace");
        replayed += 1;
    }
    assert_eq!(replayed, 2);

    let rows = index.query(&IndexQuery::default()).expect("query");
    let keys: Vec<(String, String)> = rows
        .into_iter()
        .map(|row| (row.date.as_str().to_string(), row.id))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("2025-07-01".to_string(), "aa01".to_string()),
            ("2025-07-02".to_string(), "bb02".to_string()),
        ]
    );
}

#[test]
fn query_orders_by_date_then_id() {
    let dir = temp_dir("query_orders_by_date_then_id");
    let store = open_store(dir.clone(), true);

    let d2 = date("2025-07-02");
    let mut r2 = DayRecord::new(d2.clone(), "+00:00");
    r2.tasks.push(task("zz09", "Later day", &d2, 1_000));
    store.save_day(&r2, "seed").expect("save");

    let d1 = date("2025-07-01");
    let mut r1 = DayRecord::new(d1.clone(), "+00:00");
    r1.tasks.push(task("mm05", "Earlier day", &d1, 1_000));
    r1.tasks.push(task("aa01", "Earlier day too", &d1, 2_000));
    store.save_day(&r1, "seed").expect("save");

    let index = store.index().expect("index enabled");
    let rows = index.query(&IndexQuery::default()).expect("query");
    let keys: Vec<(String, String)> = rows
        .into_iter()
        .map(|row| (row.date.as_str().to_string(), row.id))
        .collect();
    assert_eq!(
        keys,
        vec![
            ("2025-07-01".to_string(), "aa01".to_string()),
            ("2025-07-01".to_string(), "mm05".to_string()),
            ("2025-07-02".to_string(), "zz09".to_string()),
        ]
    );
}
