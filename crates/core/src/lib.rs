#![forbid(unsafe_code)]

pub mod dates;
pub mod fuzzy;
pub mod ids;
pub mod model;
pub mod tags;

#[cfg(test)]
mod tests;

pub use dates::{DayDate, UtcOffset};
pub use model::{DayRecord, HistoryEvent, TaskItem, TaskStatus};
