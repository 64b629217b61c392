//! Schedulers producing a [`Schedule`](crate::models::Schedule) from a graph.
//!
//! # Algorithm
//!
//! [`SimpleScheduler`] is a serial baseline: topological priority, the
//! first contractor able to staff each unit, and the largest crew allowed.
//! It is not optimal, but gives a fast feasible schedule and a seed for
//! genetic search.
//!
//! # References
//!
//! - Kolisch (1996), "Serial and parallel resource-constrained project
//!   scheduling methods revisited"

mod simple;

pub use simple::SimpleScheduler;

use crate::error::Result;
use crate::graph::WorkGraph;
use crate::models::{Contractor, Schedule};

/// Produces a schedule for every node of a graph.
pub trait Scheduler {
    /// Schedules `graph` with the given contractors.
    ///
    /// # Errors
    /// `NoSuitableContractor` when some work cannot be staffed.
    fn schedule(&self, graph: &WorkGraph, contractors: &[Contractor]) -> Result<Schedule>;
}
