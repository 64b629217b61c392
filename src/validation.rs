//! Feasibility checks for produced schedules.
//!
//! Checks a [`Schedule`] against its graph and contractors. Detects:
//! - Graph nodes missing from the schedule
//! - Dependency edges started too early (finish plus lag)
//! - Gaps inside inseparable chains
//! - Staffed works on unknown contractors
//! - Crews larger than the contractor's capacity, alone or combined with
//!   overlapping works of the same contractor
//!
//! Every problem is collected; checking does not stop at the first one.

use std::collections::{BTreeMap, HashMap};

use crate::graph::{EdgeType, WorkGraph};
use crate::models::{Contractor, Schedule, Time};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A graph node has no scheduled work.
    MissingWork,
    /// A work starts before a dependency parent finishes (plus lag).
    PrecedenceViolation,
    /// An inseparable child does not start exactly when its parent finishes.
    InseparableGap,
    /// A staffed work names a contractor that does not exist.
    UnknownContractor,
    /// Workers of a kind exceed the contractor's capacity.
    CapacityExceeded,
}

impl ValidationError {
    fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

/// Validates a schedule.
///
/// Checks:
/// 1. Every graph node is scheduled
/// 2. Each dependency child starts no earlier than parent finish plus lag
/// 3. Inseparable children start exactly at their parent's finish
/// 4. Staffed works run on a known contractor
/// 5. No work asks for more workers of a kind than its contractor has
/// 6. At no instant do a contractor's works together exceed its capacity
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_schedule(
    schedule: &Schedule,
    graph: &WorkGraph,
    contractors: &[Contractor],
) -> ValidationResult {
    let mut errors = Vec::new();

    for node in graph.nodes() {
        if schedule.get(node.id()).is_none() {
            errors.push(ValidationError::new(
                ValidationErrorKind::MissingWork,
                format!("Work '{}' is not scheduled", node.id()),
            ));
        }
    }

    // Precedence
    for edge in graph.edges().filter(|e| e.is_dependency()) {
        let parent = &graph[edge.start];
        let child = &graph[edge.finish];
        let (Some(p), Some(c)) = (schedule.get(parent.id()), schedule.get(child.id())) else {
            continue;
        };
        if edge.edge_type == EdgeType::InseparableFinishStart {
            if c.start != p.finish {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InseparableGap,
                    format!(
                        "Work '{}' starts at {} but inseparable parent '{}' finishes at {}",
                        child.id(),
                        c.start,
                        parent.id(),
                        p.finish
                    ),
                ));
            }
        } else if c.start < p.finish + edge.lag_time() {
            errors.push(ValidationError::new(
                ValidationErrorKind::PrecedenceViolation,
                format!(
                    "Work '{}' starts at {} before '{}' finishes at {} plus lag {}",
                    child.id(),
                    c.start,
                    parent.id(),
                    p.finish,
                    edge.lag_time()
                ),
            ));
        }
    }

    let by_id: HashMap<&str, &Contractor> =
        contractors.iter().map(|c| (c.id.as_str(), c)).collect();

    // Per-work staffing
    for work in schedule.works() {
        if work.workers.iter().all(|w| w.count == 0) {
            continue;
        }
        let Some(contractor) = by_id.get(work.contractor_id.as_str()) else {
            errors.push(ValidationError::new(
                ValidationErrorKind::UnknownContractor,
                format!(
                    "Work '{}' references unknown contractor '{}'",
                    work.work_id, work.contractor_id
                ),
            ));
            continue;
        };
        for worker in &work.workers {
            let capacity = contractor.capacity(&worker.kind);
            if worker.count > capacity {
                errors.push(ValidationError::new(
                    ValidationErrorKind::CapacityExceeded,
                    format!(
                        "Work '{}' uses {} '{}' but contractor '{}' has {}",
                        work.work_id, worker.count, worker.kind, contractor.id, capacity
                    ),
                ));
            }
        }
    }

    // Concurrent usage
    for contractor in contractors {
        let mut deltas: BTreeMap<(&str, Time), i64> = BTreeMap::new();
        for work in schedule.works_for_contractor(&contractor.id) {
            if work.start >= work.finish {
                continue;
            }
            for worker in work.workers.iter().filter(|w| w.count > 0) {
                let count = i64::from(worker.count);
                *deltas.entry((worker.kind.as_str(), work.start)).or_default() += count;
                *deltas.entry((worker.kind.as_str(), work.finish)).or_default() -= count;
            }
        }

        let mut current_kind = "";
        let mut used = 0i64;
        let mut reported = false;
        for ((kind, time), delta) in deltas {
            if kind != current_kind {
                current_kind = kind;
                used = 0;
                reported = false;
            }
            used += delta;
            let capacity = i64::from(contractor.capacity(kind));
            if used > capacity && !reported {
                reported = true;
                errors.push(ValidationError::new(
                    ValidationErrorKind::CapacityExceeded,
                    format!(
                        "Contractor '{}' needs {} '{}' at {} but has {}",
                        contractor.id, used, kind, time, capacity
                    ),
                ));
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
