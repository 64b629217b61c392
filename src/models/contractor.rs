//! Contractor and worker model.
//!
//! A contractor supplies crews of workers. For each resource kind it
//! holds a single [`Worker`] entry whose `count` is the contractor's
//! capacity (border) for that kind.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A resource supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contractor {
    /// Unique contractor identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Worker pools keyed by resource kind.
    pub workers: BTreeMap<String, Worker>,
}

/// A pool of interchangeable workers of one kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Worker {
    /// Pool identifier.
    pub id: String,
    /// Resource kind supplied.
    pub kind: String,
    /// Number of workers available simultaneously.
    pub count: u32,
    /// Owning contractor.
    pub contractor_id: String,
}

impl Contractor {
    /// Creates a contractor with no workers.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            workers: BTreeMap::new(),
        }
    }

    /// Sets the contractor name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Adds (or replaces) the pool for a kind.
    pub fn with_workers(mut self, kind: impl Into<String>, count: u32) -> Self {
        let kind = kind.into();
        let worker = Worker {
            id: format!("{}:{}", self.id, kind),
            kind: kind.clone(),
            count,
            contractor_id: self.id.clone(),
        };
        self.workers.insert(kind, worker);
        self
    }

    /// Capacity for a kind (0 when the contractor has no such pool).
    pub fn capacity(&self, kind: &str) -> u32 {
        self.workers.get(kind).map_or(0, |w| w.count)
    }
}

impl Worker {
    /// Creates a worker pool.
    pub fn new(
        id: impl Into<String>,
        kind: impl Into<String>,
        count: u32,
        contractor_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: kind.into(),
            count,
            contractor_id: contractor_id.into(),
        }
    }
}
