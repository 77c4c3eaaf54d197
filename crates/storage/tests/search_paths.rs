#![forbid(unsafe_code)]

use dk_core::dates::DayDate;
use dk_core::model::{DayRecord, TaskItem, TaskStatus};
use dk_storage::{NullNotifier, RecordStore, SearchEngine, SearchRequest, StoreConfig};
use std::collections::BTreeSet;
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

fn task(id: &str, description: &str, tags: &[&str], day: &DayDate, ts: i64) -> TaskItem {
    let tags: Vec<String> = tags.iter().map(|tag| tag.to_string()).collect();
    TaskItem::new(id, description, &tags, "", day.clone(), ts)
}

/// Three days of fixture data, saved through a store so the index stays in
/// sync when it is enabled.
fn seed(store: &RecordStore) {
    let d1 = date("2025-07-01");
    let mut r1 = DayRecord::new(d1.clone(), "+00:00");
    r1.tasks.push(task("aa01", "Buy milk", &["errand"], &d1, 1_000));
    r1.tasks
        .push(task("bb02", "Review milk budget", &["work", "finance"], &d1, 2_000));
    store.save_day(&r1, "seed").expect("save");

    let d2 = date("2025-07-02");
    let mut r2 = DayRecord::new(d2.clone(), "+00:00");
    let mut done = task("cc03", "Send invoices", &["work", "finance"], &d2, 3_000);
    done.set_status(TaskStatus::Complete, &d2, 3_500);
    r2.tasks.push(done);
    r2.tasks.push(task("dd04", "Plan offsite", &["work"], &d2, 4_000));
    store.save_day(&r2, "seed").expect("save");

    let d3 = date("2025-07-03");
    let mut r3 = DayRecord::new(d3.clone(), "+00:00");
    let mut blocked = task("ee05", "Buy more milk", &["errand"], &d3, 5_000);
    blocked.set_status(TaskStatus::Blocked, &d3, 5_500);
    r3.tasks.push(blocked);
    r3.tasks.push({
        let mut noted = task("ff06", "Call the dentist", &[], &d3, 6_000);
        noted.set_note("ask about friday", 6_500);
        noted
    });
    store.save_day(&r3, "seed").expect("save");
}

fn hit_keys(store: &RecordStore, request: SearchRequest) -> BTreeSet<(String, String)> {
    SearchEngine::new(store)
        .search(request)
        .expect("search")
        .map(|hit| {
            let (date, task) = hit.expect("hit");
            (date.as_str().to_string(), task.id)
        })
        .collect()
}

#[test]
fn index_and_scan_agree_on_plain_queries() {
    let dir = temp_dir("index_and_scan_agree_on_plain_queries");
    let indexed = open_store(dir.clone(), true);
    seed(&indexed);
    let scanning = open_store(dir, false);

    let requests = [
        SearchRequest {
            query: Some("milk".to_string()),
            ..SearchRequest::default()
        },
        SearchRequest {
            tags: vec!["work".to_string(), "finance".to_string()],
            ..SearchRequest::default()
        },
        SearchRequest {
            statuses: vec![TaskStatus::Blocked, TaskStatus::Complete],
            ..SearchRequest::default()
        },
        SearchRequest {
            from: Some(date("2025-07-02")),
            to: Some(date("2025-07-03")),
            ..SearchRequest::default()
        },
        SearchRequest::default(),
    ];

    for request in requests {
        let from_index = hit_keys(&indexed, request.clone());
        let from_scan = hit_keys(&scanning, request.clone());
        assert_eq!(from_index, from_scan, "diverged on {request:?}");
    }
}

#[test]
fn empty_query_matches_everything_after_filters() {
    let dir = temp_dir("empty_query_matches_everything_after_filters");
    let store = open_store(dir, false);
    seed(&store);

    let all = hit_keys(&store, SearchRequest::default());
    assert_eq!(all.len(), 6);

    let only_errands = hit_keys(
        &store,
        SearchRequest {
            tags: vec!["errand".to_string()],
            ..SearchRequest::default()
        },
    );
    assert_eq!(only_errands.len(), 2);
}

#[test]
fn tag_filter_is_an_intersection() {
    let dir = temp_dir("tag_filter_is_an_intersection");
    let store = open_store(dir, false);
    seed(&store);

    let hits = hit_keys(
        &store,
        SearchRequest {
            tags: vec!["work".to_string(), "finance".to_string()],
            ..SearchRequest::default()
        },
    );
    let expected: BTreeSet<(String, String)> = [
        ("2025-07-01".to_string(), "bb02".to_string()),
        ("2025-07-02".to_string(), "cc03".to_string()),
    ]
    .into();
    assert_eq!(hits, expected);
}

#[test]
fn regex_mode_scans_and_matches_case_insensitively() {
    let dir = temp_dir("regex_mode_scans_and_matches_case_insensitively");
    let store = open_store(dir, true);
    seed(&store);

    let hits = hit_keys(
        &store,
        SearchRequest {
            query: Some("^buy .*milk$".to_string()),
            use_regex: true,
            ..SearchRequest::default()
        },
    );
    let expected: BTreeSet<(String, String)> = [
        ("2025-07-01".to_string(), "aa01".to_string()),
        ("2025-07-03".to_string(), "ee05".to_string()),
    ]
    .into();
    assert_eq!(hits, expected);
}

#[test]
fn fuzzy_mode_scans_at_threshold_seventy() {
    let dir = temp_dir("fuzzy_mode_scans_at_threshold_seventy");
    let store = open_store(dir, true);
    seed(&store);

    // One character off a short description still clears the threshold.
    let hits = hit_keys(
        &store,
        SearchRequest {
            query: Some("buy milks".to_string()),
            use_fuzzy: true,
            ..SearchRequest::default()
        },
    );
    assert!(hits.contains(&("2025-07-01".to_string(), "aa01".to_string())));
    assert!(!hits.contains(&("2025-07-03".to_string(), "ff06".to_string())));
}

#[test]
fn fuzzy_results_come_from_day_files_with_full_fields() {
    let dir = temp_dir("fuzzy_results_come_from_day_files_with_full_fields");
    let store = open_store(dir, true);
    seed(&store);

    // Index-backed hits are lightweight reconstructions: no note, no history.
    let plain: Vec<_> = SearchEngine::new(&store)
        .search(SearchRequest {
            query: Some("dentist".to_string()),
            ..SearchRequest::default()
        })
        .expect("search")
        .map(|hit| hit.expect("hit"))
        .collect();
    assert_eq!(plain.len(), 1);
    assert!(plain[0].1.note.is_empty());
    assert!(plain[0].1.history.is_empty());

    // Fuzzy forces the scan, which yields the full task.
    let fuzzy: Vec<_> = SearchEngine::new(&store)
        .search(SearchRequest {
            query: Some("call the dentisd".to_string()),
            use_fuzzy: true,
            ..SearchRequest::default()
        })
        .expect("search")
        .map(|hit| hit.expect("hit"))
        .collect();
    assert_eq!(fuzzy.len(), 1);
    assert_eq!(fuzzy[0].1.note, "ask about friday");
    assert!(!fuzzy[0].1.history.is_empty());
}
