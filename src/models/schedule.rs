//! Schedule (solution) model.
//!
//! A schedule records, for every work unit, when it runs, which
//! contractor supplies it, and how many workers of each kind it holds.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Time;

/// A complete schedule.
///
/// Works are kept in insertion order; lookups by work id go through an
/// index rebuilt on deserialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "Vec<ScheduledWork>", into = "Vec<ScheduledWork>")]
pub struct Schedule {
    works: Vec<ScheduledWork>,
    index: HashMap<String, usize>,
}

/// A work placed in time with an assigned crew.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledWork {
    /// Scheduled work id.
    pub work_id: String,
    /// Supplying contractor id.
    pub contractor_id: String,
    /// Start time.
    pub start: Time,
    /// Finish time.
    pub finish: Time,
    /// Crew held for the whole `[start, finish)` interval.
    pub workers: Vec<WorkerAssignment>,
}

/// A number of workers of one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerAssignment {
    /// Resource kind.
    pub kind: String,
    /// Number of workers.
    pub count: u32,
}

impl WorkerAssignment {
    /// Creates an assignment.
    pub fn new(kind: impl Into<String>, count: u32) -> Self {
        Self {
            kind: kind.into(),
            count,
        }
    }
}

impl ScheduledWork {
    /// Creates a scheduled work without workers.
    pub fn new(
        work_id: impl Into<String>,
        contractor_id: impl Into<String>,
        start: Time,
        finish: Time,
    ) -> Self {
        Self {
            work_id: work_id.into(),
            contractor_id: contractor_id.into(),
            start,
            finish,
            workers: Vec::new(),
        }
    }

    /// Adds a crew entry.
    pub fn with_workers(mut self, kind: impl Into<String>, count: u32) -> Self {
        self.workers.push(WorkerAssignment::new(kind, count));
        self
    }

    /// `finish - start`.
    #[inline]
    pub fn duration(&self) -> Time {
        self.finish - self.start
    }

    /// Workers of a kind held by this work (0 if none).
    pub fn count_of(&self, kind: &str) -> u32 {
        self.workers
            .iter()
            .filter(|w| w.kind == kind)
            .map(|w| w.count)
            .sum()
    }
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a schedule from scheduled works. A later entry for the same
    /// work id replaces the earlier one.
    pub fn from_scheduled_works(works: impl IntoIterator<Item = ScheduledWork>) -> Self {
        let mut schedule = Self::new();
        for work in works {
            schedule.add(work);
        }
        schedule
    }

    /// Adds or replaces a scheduled work.
    pub fn add(&mut self, work: ScheduledWork) {
        match self.index.get(&work.work_id) {
            Some(&i) => self.works[i] = work,
            None => {
                self.index.insert(work.work_id.clone(), self.works.len());
                self.works.push(work);
            }
        }
    }

    /// Finds the entry for a work id.
    pub fn get(&self, work_id: &str) -> Option<&ScheduledWork> {
        self.index.get(work_id).map(|&i| &self.works[i])
    }

    /// All entries in insertion order.
    pub fn works(&self) -> &[ScheduledWork] {
        &self.works
    }

    /// Entries supplied by a contractor.
    pub fn works_for_contractor(&self, contractor_id: &str) -> Vec<&ScheduledWork> {
        self.works
            .iter()
            .filter(|w| w.contractor_id == contractor_id)
            .collect()
    }

    /// Latest finish across all works (zero when empty).
    pub fn execution_time(&self) -> Time {
        self.works
            .iter()
            .map(|w| w.finish)
            .max()
            .unwrap_or_default()
    }

    /// Number of scheduled works.
    pub fn len(&self) -> usize {
        self.works.len()
    }

    /// Whether nothing is scheduled.
    pub fn is_empty(&self) -> bool {
        self.works.is_empty()
    }
}

impl From<Vec<ScheduledWork>> for Schedule {
    fn from(works: Vec<ScheduledWork>) -> Self {
        Self::from_scheduled_works(works)
    }
}

impl From<Schedule> for Vec<ScheduledWork> {
    fn from(schedule: Schedule) -> Self {
        schedule.works
    }
}
