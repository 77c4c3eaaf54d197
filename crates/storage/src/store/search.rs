#![forbid(unsafe_code)]

use super::index::IndexRow;
use super::records::RecordStore;
use super::requests::{IndexQuery, SearchRequest};
use super::StoreError;
use dk_core::dates::DayDate;
use dk_core::model::{TaskItem, TaskStatus};
use dk_core::{fuzzy, tags};
use regex::{Regex, RegexBuilder};
use std::collections::VecDeque;

const FUZZY_THRESHOLD: u8 = 70;

/// Answers cross-day queries, from the derived index when it can do so with
/// exact semantics and by scanning day files otherwise.
pub struct SearchEngine<'a> {
    store: &'a RecordStore,
}

impl<'a> SearchEngine<'a> {
    pub fn new(store: &'a RecordStore) -> Self {
        Self { store }
    }

    /// Lazily produced `(date, task)` hits, ordered by date then id on the
    /// index path and by date then day-file order on the scan path. The
    /// sequence is finite and single-pass; re-run the search to restart.
    pub fn search(&self, request: SearchRequest) -> Result<SearchResults<'a>, StoreError> {
        let tag_filter = tags::normalize(&request.tags);

        // The index is a lossy projection of the description text, so regex
        // and fuzzy queries can never be answered from it.
        if !request.use_regex && !request.use_fuzzy {
            if let Some(index) = self.store.index() {
                let rows = index.query(&IndexQuery {
                    text: request.query.clone(),
                    tags: tag_filter.clone(),
                    statuses: request.statuses.clone(),
                    from: request.from.clone(),
                    to: request.to.clone(),
                })?;
                return Ok(SearchResults {
                    inner: ResultsInner::Index(rows.into_iter()),
                });
            }
        }

        let filter = TextFilter::compile(&request)?;
        let dates: Vec<DayDate> = self
            .store
            .enumerate_day_dates()?
            .into_iter()
            .filter(|date| request.from.as_ref().is_none_or(|from| date >= from))
            .filter(|date| request.to.as_ref().is_none_or(|to| date <= to))
            .collect();

        Ok(SearchResults {
            inner: ResultsInner::Scan {
                store: self.store,
                dates: dates.into_iter(),
                pending: VecDeque::new(),
                tags: tag_filter,
                statuses: request.statuses,
                filter,
                failed: false,
            },
        })
    }
}

pub struct SearchResults<'a> {
    inner: ResultsInner<'a>,
}

enum ResultsInner<'a> {
    Index(std::vec::IntoIter<IndexRow>),
    Scan {
        store: &'a RecordStore,
        dates: std::vec::IntoIter<DayDate>,
        pending: VecDeque<(DayDate, TaskItem)>,
        tags: Vec<String>,
        statuses: Vec<TaskStatus>,
        filter: TextFilter,
        failed: bool,
    },
}

impl Iterator for SearchResults<'_> {
    type Item = Result<(DayDate, TaskItem), StoreError>;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            ResultsInner::Index(rows) => rows.next().map(|row| Ok(row.into_task())),
            ResultsInner::Scan {
                store,
                dates,
                pending,
                tags,
                statuses,
                filter,
                failed,
            } => loop {
                if *failed {
                    return None;
                }
                if let Some(hit) = pending.pop_front() {
                    return Some(Ok(hit));
                }
                let date = dates.next()?;
                let record = match store.load_day(&date) {
                    Ok(record) => record,
                    Err(err) => {
                        *failed = true;
                        return Some(Err(err));
                    }
                };
                for task in record.tasks {
                    if !tags.iter().all(|tag| task.has_tag(tag)) {
                        continue;
                    }
                    if !statuses.is_empty() && !statuses.contains(&task.status) {
                        continue;
                    }
                    if !filter.matches(&task.description) {
                        continue;
                    }
                    pending.push_back((date.clone(), task));
                }
            },
        }
    }
}

/// Compiled text predicate for the scan path.
enum TextFilter {
    /// Empty query: everything passes (tag/status/date filters still apply).
    All,
    Substring(String),
    Regex(Regex),
    Fuzzy(String),
}

impl TextFilter {
    fn compile(request: &SearchRequest) -> Result<Self, StoreError> {
        let query = request
            .query
            .as_deref()
            .map(str::trim)
            .filter(|query| !query.is_empty());
        let Some(query) = query else {
            return Ok(Self::All);
        };
        if request.use_regex {
            let regex = RegexBuilder::new(query)
                .case_insensitive(true)
                .build()
                .map_err(StoreError::InvalidRegex)?;
            return Ok(Self::Regex(regex));
        }
        if request.use_fuzzy {
            return Ok(Self::Fuzzy(query.to_string()));
        }
        Ok(Self::Substring(query.to_lowercase()))
    }

    fn matches(&self, description: &str) -> bool {
        match self {
            Self::All => true,
            Self::Substring(needle) => description.to_lowercase().contains(needle),
            Self::Regex(regex) => regex.is_match(description),
            Self::Fuzzy(query) => fuzzy::similarity(description, query) >= FUZZY_THRESHOLD,
        }
    }
}
