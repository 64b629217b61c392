//! Precedence graph of a project.
//!
//! Works are nodes; typed edges relate them. Finish-start style edges
//! (`FS`, `IFS`, `FFS`) are ordering dependencies and define the
//! topological order; start-start edges only mark neighbors.
//!
//! # Structure
//!
//! - [`GraphBuilder`]: the assembler. Nodes are added with their parents;
//!   both sides of every edge are linked at once.
//! - [`WorkGraph`]: the frozen graph. Nodes are stored in an arena in
//!   topological order and refer to each other by [`NodeIndex`], so the
//!   parent/child back-references never form ownership cycles.
//! - [`GraphNode`]: a work unit with its edges and derived views, all
//!   computed eagerly when the graph is built.
//!
//! # Inseparable chains
//!
//! Nodes linked by `InseparableFinishStart` edges must run back-to-back.
//! A node has at most one inseparable child and one inseparable parent;
//! the head of a chain stores the whole chain.
//!
//! # Reference
//! Kolisch & Hartmann (2006), "Experimental investigation of heuristics
//! for resource-constrained project scheduling"

mod adjacency;
mod builder;
mod edge;
mod node;
mod traverse;
mod work_graph;

pub use adjacency::{AdjacencyMatrix, DEFAULT_EDGE_WEIGHT};
pub use builder::GraphBuilder;
pub use edge::{EdgeType, GraphEdge, NodeIndex, DEFAULT_LAG};
pub use node::GraphNode;
pub use traverse::{Adjacency, Traversal};
pub use work_graph::{SerializedGraph, SerializedNode, WorkGraph};
