//! Graph node with eagerly derived views.

use std::collections::HashSet;

use super::{EdgeType, GraphEdge, NodeIndex};
use crate::models::WorkUnit;

/// A node of a [`WorkGraph`](super::WorkGraph).
///
/// Owns its work unit and both edge lists. Everything else (parents,
/// children, inseparable links, the inseparable chain) is derived once when
/// the graph is built and stored as plain fields, so nodes are read-only
/// and freely shared across threads.
#[derive(Debug, Clone)]
pub struct GraphNode {
    index: NodeIndex,
    work_unit: WorkUnit,
    parent_edges: Vec<GraphEdge>,
    children_edges: Vec<GraphEdge>,
    parents: Vec<NodeIndex>,
    children: Vec<NodeIndex>,
    parents_set: HashSet<NodeIndex>,
    children_set: HashSet<NodeIndex>,
    neighbors: Vec<NodeIndex>,
    inseparable_son: Option<NodeIndex>,
    inseparable_parent: Option<NodeIndex>,
    chain: Vec<NodeIndex>,
}

impl GraphNode {
    pub(super) fn new(
        index: NodeIndex,
        work_unit: WorkUnit,
        parent_edges: Vec<GraphEdge>,
        children_edges: Vec<GraphEdge>,
    ) -> Self {
        let parents: Vec<NodeIndex> = parent_edges
            .iter()
            .filter(|e| e.is_dependency())
            .map(|e| e.start)
            .collect();
        let children: Vec<NodeIndex> = children_edges
            .iter()
            .filter(|e| e.is_dependency())
            .map(|e| e.finish)
            .collect();
        let neighbors = parent_edges
            .iter()
            .filter(|e| e.edge_type == EdgeType::StartStart)
            .map(|e| e.start)
            .collect();
        let inseparable_son = children_edges
            .iter()
            .find(|e| e.edge_type == EdgeType::InseparableFinishStart)
            .map(|e| e.finish);
        let inseparable_parent = parent_edges
            .iter()
            .find(|e| e.edge_type == EdgeType::InseparableFinishStart)
            .map(|e| e.start);

        Self {
            index,
            work_unit,
            parents_set: parents.iter().copied().collect(),
            children_set: children.iter().copied().collect(),
            parents,
            children,
            parent_edges,
            children_edges,
            neighbors,
            inseparable_son,
            inseparable_parent,
            chain: vec![index],
        }
    }

    pub(super) fn set_inseparable_chain(&mut self, chain: Vec<NodeIndex>) {
        debug_assert_eq!(chain.first(), Some(&self.index));
        self.chain = chain;
    }

    /// Position of this node in the graph's topological order.
    #[inline]
    pub fn index(&self) -> NodeIndex {
        self.index
    }

    /// Wrapped work unit.
    #[inline]
    pub fn work_unit(&self) -> &WorkUnit {
        &self.work_unit
    }

    /// Work unit id.
    #[inline]
    pub fn id(&self) -> &str {
        &self.work_unit.id
    }

    /// Incoming edges of every type.
    pub fn edges_to(&self) -> &[GraphEdge] {
        &self.parent_edges
    }

    /// Outgoing edges of every type.
    pub fn edges_from(&self) -> &[GraphEdge] {
        &self.children_edges
    }

    /// Dependency predecessors, in edge order.
    pub fn parents(&self) -> &[NodeIndex] {
        &self.parents
    }

    /// Dependency successors, in edge order.
    pub fn children(&self) -> &[NodeIndex] {
        &self.children
    }

    /// Unique dependency predecessors.
    pub fn parents_set(&self) -> &HashSet<NodeIndex> {
        &self.parents_set
    }

    /// Unique dependency successors.
    pub fn children_set(&self) -> &HashSet<NodeIndex> {
        &self.children_set
    }

    /// Sources of incoming start-start edges.
    pub fn neighbors(&self) -> &[NodeIndex] {
        &self.neighbors
    }

    /// Child linked by an inseparable edge.
    pub fn inseparable_son(&self) -> Option<NodeIndex> {
        self.inseparable_son
    }

    /// Parent linked by an inseparable edge.
    pub fn inseparable_parent(&self) -> Option<NodeIndex> {
        self.inseparable_parent
    }

    /// Whether the node has an inseparable child.
    pub fn is_inseparable_parent(&self) -> bool {
        self.inseparable_son.is_some()
    }

    /// Whether the node has an inseparable parent.
    pub fn is_inseparable_son(&self) -> bool {
        self.inseparable_parent.is_some()
    }

    /// Whether the node starts an inseparable chain.
    pub fn is_chain_head(&self) -> bool {
        self.inseparable_son.is_some() && self.inseparable_parent.is_none()
    }

    /// The whole inseparable chain `[self, son, grandson, ..]` if this node
    /// is its head, `None` otherwise (including for chain members).
    pub fn inseparable_chain(&self) -> Option<&[NodeIndex]> {
        self.is_chain_head().then_some(self.chain.as_slice())
    }

    /// The inseparable chain if this node heads one, else `[self]`.
    pub fn inseparable_chain_with_self(&self) -> &[NodeIndex] {
        &self.chain
    }
}
