//! Sparse weighted adjacency matrix.

use std::collections::BTreeMap;

use super::NodeIndex;

/// Weight of edges leaving a node that requests no resources. Kept
/// non-zero so the entry still marks an existing edge.
pub const DEFAULT_EDGE_WEIGHT: f64 = 0.000001;

/// Dictionary-of-keys sparse matrix over node indices.
///
/// Entry `(i, j)` exists iff there is a dependency edge `i → j`; its value
/// is the largest requirement volume of node `i`, or
/// [`DEFAULT_EDGE_WEIGHT`] when node `i` requires nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdjacencyMatrix {
    size: usize,
    entries: BTreeMap<(NodeIndex, NodeIndex), f64>,
}

impl AdjacencyMatrix {
    pub(super) fn new(size: usize) -> Self {
        Self {
            size,
            entries: BTreeMap::new(),
        }
    }

    pub(super) fn insert(&mut self, from: NodeIndex, to: NodeIndex, weight: f64) {
        debug_assert!(from.index() < self.size && to.index() < self.size);
        self.entries.insert((from, to), weight);
    }

    /// Matrix dimension (node count).
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    /// Weight of `from → to`, or `0.0` when there is no edge.
    pub fn get(&self, from: NodeIndex, to: NodeIndex) -> f64 {
        self.entries.get(&(from, to)).copied().unwrap_or(0.0)
    }

    /// Whether `from → to` is stored.
    pub fn contains(&self, from: NodeIndex, to: NodeIndex) -> bool {
        self.entries.contains_key(&(from, to))
    }

    /// Stored entries of one row, by column.
    pub fn row(&self, from: NodeIndex) -> impl Iterator<Item = (NodeIndex, f64)> + '_ {
        self.entries
            .range((from, NodeIndex::new(0))..=(from, NodeIndex::new(usize::MAX)))
            .map(|(&(_, to), &w)| (to, w))
    }

    /// All stored entries in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, f64)> + '_ {
        self.entries.iter().map(|(&(i, j), &w)| (i, j, w))
    }

    /// Dense row-major copy.
    pub fn to_dense(&self) -> Vec<Vec<f64>> {
        let mut dense = vec![vec![0.0; self.size]; self.size];
        for (i, j, w) in self.iter() {
            dense[i.index()][j.index()] = w;
        }
        dense
    }
}
