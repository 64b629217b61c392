//! Work unit model.
//!
//! A work unit is the smallest schedulable piece of a project. It carries
//! a volume of work per resource kind and bounds on crew size; the
//! precedence structure lives in the graph, not here.
//!
//! # Duration Model
//!
//! Durations are produced by a [`WorkTimeEstimator`]. The default estimator
//! divides each requirement's volume by the assigned crew and takes the
//! slowest kind.

use serde::{Deserialize, Serialize};

use super::{Time, WorkerAssignment};

/// A unit of work to be scheduled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkUnit {
    /// Unique work identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Per-kind requirements, in declaration order.
    pub worker_reqs: Vec<WorkerReq>,
    /// Marks zero-duration milestones (project start/finish).
    pub is_service_unit: bool,
}

impl WorkUnit {
    /// Creates a work unit without requirements.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            worker_reqs: Vec::new(),
            is_service_unit: false,
        }
    }

    /// Creates a zero-duration milestone.
    pub fn service(id: impl Into<String>) -> Self {
        Self {
            is_service_unit: true,
            ..Self::new(id)
        }
    }

    /// Sets the work name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds a requirement.
    pub fn with_req(mut self, req: WorkerReq) -> Self {
        self.worker_reqs.push(req);
        self
    }

    /// Returns the requirement for a kind, if any.
    pub fn req_for(&self, kind: &str) -> Option<&WorkerReq> {
        self.worker_reqs.iter().find(|r| r.kind == kind)
    }

    /// Largest requirement volume, `None` when nothing is required.
    pub fn max_volume(&self) -> Option<f64> {
        self.worker_reqs.iter().map(|r| r.volume).reduce(f64::max)
    }
}

/// Requirement of a single resource kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerReq {
    /// Resource kind (e.g., "driver", "welder").
    pub kind: String,
    /// Amount of work for this kind, in worker-time units.
    pub volume: f64,
    /// Smallest crew the work can run with.
    pub min_count: u32,
    /// Largest useful crew.
    pub max_count: u32,
}

impl WorkerReq {
    /// Creates a requirement with crew bounds `[1, 1]`.
    pub fn new(kind: impl Into<String>, volume: f64) -> Self {
        Self {
            kind: kind.into(),
            volume,
            min_count: 1,
            max_count: 1,
        }
    }

    /// Sets the crew bounds.
    pub fn with_counts(mut self, min_count: u32, max_count: u32) -> Self {
        self.min_count = min_count;
        self.max_count = max_count.max(min_count);
        self
    }
}

/// Computes how long a work takes with a given crew.
///
/// Implementations must be pure: the codec calls them from concurrent
/// decodes against a shared graph.
pub trait WorkTimeEstimator: Send + Sync {
    /// Duration of `work` performed by `workers`.
    fn estimate(&self, work: &WorkUnit, workers: &[WorkerAssignment]) -> Time;
}

/// Volume divided by crew size, slowest kind wins.
///
/// Service units and works without requirements take no time. A required
/// kind with no assigned workers never finishes (`Time::inf()`).
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultWorkTimeEstimator;

impl WorkTimeEstimator for DefaultWorkTimeEstimator {
    fn estimate(&self, work: &WorkUnit, workers: &[WorkerAssignment]) -> Time {
        if work.is_service_unit {
            return Time::zero();
        }
        work.worker_reqs
            .iter()
            .filter(|req| req.volume > 0.0)
            .map(|req| {
                let count = workers
                    .iter()
                    .find(|w| w.kind == req.kind)
                    .map_or(0, |w| w.count);
                if count == 0 {
                    Time::inf()
                } else {
                    Time::new((req.volume / f64::from(count)).ceil() as i64)
                }
            })
            .max()
            .unwrap_or_default()
    }
}
