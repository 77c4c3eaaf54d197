#![forbid(unsafe_code)]

use super::records::RecordStore;
use super::StoreError;
use dk_core::dates::{DayDate, UtcOffset};
use dk_core::model::{now_ms, DayRecord, TaskStatus};

/// Carries unfinished work across the day boundary. Run once per process
/// start; idempotent per day because the terminal state is "today's file
/// exists on disk".
pub struct RollForward<'a> {
    store: &'a RecordStore,
    offset: UtcOffset,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RollForwardOutcome {
    /// Today's record already exists; nothing to do.
    AlreadyRolled,
    /// No prior day at all; an empty record was persisted.
    CreatedEmpty,
    Carried {
        from: DayDate,
        carried: usize,
    },
}

impl<'a> RollForward<'a> {
    pub fn new(store: &'a RecordStore, offset: UtcOffset) -> Self {
        Self { store, offset }
    }

    pub fn run_if_needed(&self, today: &DayDate) -> Result<RollForwardOutcome, StoreError> {
        if self.store.day_exists(today) {
            return Ok(RollForwardOutcome::AlreadyRolled);
        }

        let prior = match self.store.find_most_recent_prior_day(today) {
            Ok(prior) => prior,
            // A prior day that exists but cannot be read is fatal here.
            // Fabricating an empty carry set would silently drop work.
            Err(StoreError::CorruptRecord { date, source }) => {
                return Err(StoreError::RollForwardSourceUnreadable {
                    date,
                    detail: source.to_string(),
                });
            }
            Err(err) => return Err(err),
        };

        let mut record = DayRecord::new(today.clone(), self.store.timezone().to_string());

        let Some((prior_date, prior_record)) = prior else {
            self.store.save_day(&record, "create new day (no previous)")?;
            return Ok(RollForwardOutcome::CreatedEmpty);
        };

        let mut candidates: Vec<_> = prior_record
            .tasks
            .iter()
            .filter(|task| !task.archived && task.status != TaskStatus::Complete)
            .collect();

        if candidates.is_empty() {
            // Everything was completed or archived. Tasks touched on the
            // prior day still carry, so standup summaries can see them.
            candidates = prior_record
                .tasks
                .iter()
                .filter(|task| !task.archived && task.touched_on(&prior_date, self.offset))
                .collect();
        }

        let now = now_ms();
        record.tasks = candidates
            .iter()
            .map(|task| task.carried_copy(&prior_date, today, now))
            .collect();
        let carried = record.tasks.len();

        self.store.save_day(&record, "roll-forward")?;
        Ok(RollForwardOutcome::Carried {
            from: prior_date,
            carried,
        })
    }
}
