//! Typed precedence edges.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::Time;

/// Lag stored on edges created from bare parent references.
pub const DEFAULT_LAG: f64 = -1.0;

/// Arena index of a node inside a [`WorkGraph`](super::WorkGraph) or
/// [`GraphBuilder`](super::GraphBuilder).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeIndex(usize);

impl NodeIndex {
    /// Wraps a raw arena position.
    #[inline]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Raw arena position.
    #[inline]
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Kind of relation between two works.
///
/// Serialized with the short codes used by project files. The legacy
/// code `"-1"` reads as [`EdgeType::FinishStart`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeType {
    /// Child starts exactly when the parent finishes; both belong to one
    /// inseparable chain.
    #[serde(rename = "IFS")]
    InseparableFinishStart,
    /// Finish-start with an explicit lag.
    #[serde(rename = "FFS")]
    LagFinishStart,
    /// Start-start (neighbor relation, not an ordering dependency).
    #[serde(rename = "SS")]
    StartStart,
    /// Finish-finish.
    #[serde(rename = "FF")]
    FinishFinish,
    /// Plain finish-start.
    #[default]
    #[serde(rename = "FS", alias = "-1")]
    FinishStart,
    /// Start-finish.
    #[serde(rename = "SF")]
    StartFinish,
}

impl EdgeType {
    /// Short code (`"IFS"`, `"FFS"`, `"SS"`, `"FF"`, `"FS"`, `"SF"`).
    pub fn code(self) -> &'static str {
        match self {
            EdgeType::InseparableFinishStart => "IFS",
            EdgeType::LagFinishStart => "FFS",
            EdgeType::StartStart => "SS",
            EdgeType::FinishFinish => "FF",
            EdgeType::FinishStart => "FS",
            EdgeType::StartFinish => "SF",
        }
    }

    /// Parses a short code, accepting the legacy `"-1"` as finish-start.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "IFS" => Some(EdgeType::InseparableFinishStart),
            "FFS" => Some(EdgeType::LagFinishStart),
            "SS" => Some(EdgeType::StartStart),
            "FF" => Some(EdgeType::FinishFinish),
            "FS" | "-1" => Some(EdgeType::FinishStart),
            "SF" => Some(EdgeType::StartFinish),
            _ => None,
        }
    }

    /// Whether the edge orders its endpoints (participates in topological
    /// order and in `parents`/`children`).
    pub fn is_dependency(self) -> bool {
        matches!(
            self,
            EdgeType::FinishStart | EdgeType::InseparableFinishStart | EdgeType::LagFinishStart
        )
    }
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Directed edge `start → finish`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphEdge {
    /// Source (parent) node.
    pub start: NodeIndex,
    /// Target (child) node.
    pub finish: NodeIndex,
    /// Lag in time units; negative values mean "no lag".
    pub lag: f64,
    /// Relation kind.
    pub edge_type: EdgeType,
}

impl GraphEdge {
    /// Creates an edge.
    pub fn new(start: NodeIndex, finish: NodeIndex, lag: f64, edge_type: EdgeType) -> Self {
        Self {
            start,
            finish,
            lag,
            edge_type,
        }
    }

    /// Whether this edge is an ordering dependency.
    #[inline]
    pub fn is_dependency(&self) -> bool {
        self.edge_type.is_dependency()
    }

    /// Lag as a time offset, rounded up; negative lags count as zero.
    pub fn lag_time(&self) -> Time {
        if self.lag > 0.0 {
            Time::new(self.lag.ceil() as i64)
        } else {
            Time::zero()
        }
    }
}
