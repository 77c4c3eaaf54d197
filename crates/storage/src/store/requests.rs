#![forbid(unsafe_code)]

use dk_core::dates::DayDate;
use dk_core::model::TaskStatus;

/// Filter set for a derived-index query. All filters compose with AND;
/// requested tags must all be present (intersection, not union).
#[derive(Clone, Debug, Default)]
pub struct IndexQuery {
    pub text: Option<String>,
    pub tags: Vec<String>,
    pub statuses: Vec<TaskStatus>,
    pub from: Option<DayDate>,
    pub to: Option<DayDate>,
}

/// A cross-day search. Regex and fuzzy modes always force a full scan of
/// day files; the derived index only answers plain queries.
#[derive(Clone, Debug, Default)]
pub struct SearchRequest {
    pub query: Option<String>,
    pub use_regex: bool,
    pub use_fuzzy: bool,
    pub tags: Vec<String>,
    pub statuses: Vec<TaskStatus>,
    pub from: Option<DayDate>,
    pub to: Option<DayDate>,
}
