//! Resource-constrained project scheduling core.
//!
//! Provides the precedence graph of a project, a saturating time type, and
//! the chromosome encoding a genetic search uses to explore schedules.
//! Search drivers (population, operators, selection) sit on top of this
//! crate.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Time`, `WorkUnit`, `WorkerReq`,
//!   `Contractor`, `Schedule`, `ScheduledWork`, `WorkTimeEstimator`
//! - **`graph`**: Precedence graph: `GraphBuilder`, `WorkGraph`, `GraphNode`,
//!   `EdgeType`, traversal and sparse adjacency
//! - **`ga`**: `Chromosome` and `ChromosomeCodec` (schedule ⇄ chromosome)
//! - **`scheduler`**: `Scheduler` trait and a serial baseline
//! - **`validation`**: Feasibility checks for produced schedules
//!
//! # Logging
//!
//! Emits `tracing` events (graph build summary, decode progress, adjusted
//! allocations). No subscriber is installed.
//!
//! # References
//!
//! - Kolisch & Hartmann (2006), "Experimental investigation of heuristics
//!   for resource-constrained project scheduling"
//! - Hartmann (1998), "A competitive genetic algorithm for
//!   resource-constrained project scheduling"

pub mod error;
pub mod ga;
pub mod graph;
pub mod models;
pub mod scheduler;
pub mod validation;

pub use error::{Error, Result};
