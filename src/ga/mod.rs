//! Chromosome encoding for genetic project scheduling.
//!
//! A genetic driver searches over [`Chromosome`]s; [`ChromosomeCodec`]
//! turns schedules into chromosomes and back against one graph and one set
//! of contractors. The driver itself (population, operators, selection)
//! lives outside this crate.
//!
//! # Encoding
//!
//! Columns follow the graph's topological node indices:
//! - **order**: scheduling priority permutation
//! - **resources**: workers per resource kind and node
//! - **contractors**: contractor running each node
//! - **borders**: per-contractor, per-kind capacity
//!
//! Resource kinds are indexed in sorted order of their names.

mod chromosome;
mod codec;
mod timeline;

pub use chromosome::Chromosome;
pub use codec::ChromosomeCodec;
