//! Immutable precedence graph.

use std::collections::{BTreeSet, HashMap};
use std::hash::{Hash, Hasher};
use std::ops::Index;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{
    Adjacency, AdjacencyMatrix, EdgeType, GraphBuilder, GraphEdge, GraphNode, NodeIndex,
    Traversal,
};
use crate::error::{Error, Result};
use crate::models::WorkUnit;

/// Precedence graph of a project.
///
/// Built once by [`GraphBuilder::build`] and never mutated. Nodes live in
/// an arena in topological order, so `NodeIndex(i)` is also the i-th node
/// of [`WorkGraph::nodes`] and every dependency parent has a smaller index
/// than its child.
///
/// Equality and hashing consider only the `(start, finish)` ids, which
/// makes graphs cheap cache keys.
#[derive(Debug, Clone)]
pub struct WorkGraph {
    start: NodeIndex,
    finish: NodeIndex,
    nodes: Vec<GraphNode>,
    adjacency: AdjacencyMatrix,
    index_by_id: HashMap<String, NodeIndex>,
}

impl WorkGraph {
    pub(super) fn from_parts(
        start: NodeIndex,
        finish: NodeIndex,
        nodes: Vec<GraphNode>,
        adjacency: AdjacencyMatrix,
        index_by_id: HashMap<String, NodeIndex>,
    ) -> Self {
        Self {
            start,
            finish,
            nodes,
            adjacency,
            index_by_id,
        }
    }

    /// Project start node (no dependency parents).
    pub fn start(&self) -> &GraphNode {
        &self.nodes[self.start.index()]
    }

    /// Project finish node.
    pub fn finish(&self) -> &GraphNode {
        &self.nodes[self.finish.index()]
    }

    /// Nodes in topological order.
    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false` for a built graph; present for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Weighted adjacency of dependency edges.
    pub fn adjacency(&self) -> &AdjacencyMatrix {
        &self.adjacency
    }

    /// Node by work id.
    ///
    /// # Errors
    /// `NotFound` when the id is not part of the graph.
    pub fn node(&self, id: &str) -> Result<&GraphNode> {
        self.get(id)
            .ok_or_else(|| Error::NotFound(format!("work '{id}'")))
    }

    /// Node by work id, if present.
    pub fn get(&self, id: &str) -> Option<&GraphNode> {
        self.index_by_id.get(id).map(|&i| &self.nodes[i.index()])
    }

    /// Arena index of a work id.
    ///
    /// # Errors
    /// `NotFound` when the id is not part of the graph.
    pub fn index_of(&self, id: &str) -> Result<NodeIndex> {
        self.index_by_id
            .get(id)
            .copied()
            .ok_or_else(|| Error::NotFound(format!("work '{id}'")))
    }

    /// Whether a work id is part of the graph.
    pub fn contains(&self, id: &str) -> bool {
        self.index_by_id.contains_key(id)
    }

    /// Walks dependency children of `from`; see [`Traversal`].
    pub fn traverse_children(&self, from: NodeIndex, topologically: bool) -> Traversal<'_, Self> {
        Traversal::new(self, from, topologically)
    }

    /// Every edge once, grouped by target node.
    pub fn edges(&self) -> impl Iterator<Item = &GraphEdge> + '_ {
        self.nodes.iter().flat_map(|n| n.edges_to().iter())
    }

    /// Converts to the listed-nodes form used for persistence.
    ///
    /// Nodes are listed so that every parent, start-start ones included,
    /// precedes its child; the finish comes last whenever it has no
    /// children of its own.
    pub fn to_serialized(&self) -> SerializedGraph {
        let nodes = self
            .listing_order()
            .into_iter()
            .map(|i| {
                let node = &self.nodes[i];
                SerializedNode {
                    work_unit: node.work_unit().clone(),
                    parent_edges: node
                        .edges_to()
                        .iter()
                        .map(|e| (self.nodes[e.start.index()].id().to_string(), e.lag, e.edge_type))
                        .collect(),
                }
            })
            .collect();
        SerializedGraph { nodes }
    }

    /// Topological order over every edge kind, lowest index first, with
    /// the finish held back until nothing else is ready.
    fn listing_order(&self) -> Vec<usize> {
        let n = self.nodes.len();
        let finish = self.finish.index();
        let mut pending: Vec<usize> = self.nodes.iter().map(|v| v.edges_to().len()).collect();
        let mut ready: BTreeSet<usize> =
            (0..n).filter(|&i| pending[i] == 0 && i != finish).collect();
        let mut finish_ready = pending[finish] == 0;
        let mut order = Vec::with_capacity(n);

        loop {
            let next = match ready.pop_first() {
                Some(i) => i,
                None if finish_ready => {
                    finish_ready = false;
                    finish
                }
                None => break,
            };
            order.push(next);
            for edge in self.nodes[next].edges_from() {
                let child = edge.finish.index();
                pending[child] -= 1;
                if pending[child] == 0 {
                    if child == finish {
                        finish_ready = true;
                    } else {
                        ready.insert(child);
                    }
                }
            }
        }
        order
    }

    /// Rebuilds a graph from its listed-nodes form.
    ///
    /// The first node is the start and must have no parent edges; the last
    /// node is the finish. Parents are resolved against nodes listed
    /// earlier.
    ///
    /// # Errors
    /// `Structural` for an empty list, a start with parents, a parent id not
    /// listed before its child, or any error from [`GraphBuilder::build`].
    pub fn from_serialized(serialized: SerializedGraph) -> Result<Self> {
        let Some(first) = serialized.nodes.first() else {
            return Err(Error::Structural("serialized graph has no nodes".into()));
        };
        if !first.parent_edges.is_empty() {
            return Err(Error::Structural(format!(
                "first listed work '{}' must not have parents",
                first.work_unit.id
            )));
        }

        let mut builder = GraphBuilder::new();
        let mut last = NodeIndex::new(0);
        for node in serialized.nodes {
            let parents = node
                .parent_edges
                .iter()
                .map(|(parent_id, lag, edge_type)| {
                    builder
                        .index_of(parent_id)
                        .map(|p| (p, *lag, *edge_type))
                        .ok_or_else(|| {
                            Error::Structural(format!(
                                "work '{}' references parent '{}' not listed before it",
                                node.work_unit.id, parent_id
                            ))
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            last = builder.add_node(node.work_unit, parents)?;
        }
        builder.build(NodeIndex::new(0), last)
    }
}

impl Index<NodeIndex> for WorkGraph {
    type Output = GraphNode;

    fn index(&self, index: NodeIndex) -> &GraphNode {
        &self.nodes[index.index()]
    }
}

impl PartialEq for WorkGraph {
    fn eq(&self, other: &Self) -> bool {
        self.start().id() == other.start().id() && self.finish().id() == other.finish().id()
    }
}

impl Eq for WorkGraph {}

impl Hash for WorkGraph {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.start().id().hash(state);
        self.finish().id().hash(state);
    }
}

impl Adjacency for WorkGraph {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn dependency_parents(&self, node: NodeIndex) -> &[NodeIndex] {
        self.nodes[node.index()].parents()
    }

    fn dependency_children(&self, node: NodeIndex) -> &[NodeIndex] {
        self.nodes[node.index()].children()
    }
}

/// Persistence form of a [`WorkGraph`]: nodes in topological order with
/// their incoming edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedGraph {
    /// Listed nodes; parents precede children.
    pub nodes: Vec<SerializedNode>,
}

/// One listed node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SerializedNode {
    /// Wrapped work unit.
    pub work_unit: WorkUnit,
    /// Incoming edges as `(parent_id, lag, edge_type)`.
    pub parent_edges: Vec<(String, f64, EdgeType)>,
}

impl Serialize for WorkGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.to_serialized().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for WorkGraph {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let serialized = SerializedGraph::deserialize(deserializer)?;
        WorkGraph::from_serialized(serialized).map_err(serde::de::Error::custom)
    }
}
