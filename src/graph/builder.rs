//! Graph assembly.

use std::collections::HashMap;

use tracing::{debug, warn};

use super::{
    Adjacency, AdjacencyMatrix, EdgeType, GraphEdge, GraphNode, NodeIndex, Traversal, WorkGraph,
    DEFAULT_EDGE_WEIGHT, DEFAULT_LAG,
};
use crate::error::{Error, Result};
use crate::models::WorkUnit;

/// Incrementally assembles a [`WorkGraph`].
///
/// Nodes are added with their parents, which must already be present, so
/// the builder can never form a dependency cycle. Every call links both
/// sides: the child gets the incoming edge and each parent the mirrored
/// outgoing edge. There is no edge removal.
///
/// # Example
///
/// ```
/// use u_rcpsp::graph::{EdgeType, GraphBuilder};
/// use u_rcpsp::models::WorkUnit;
///
/// let mut b = GraphBuilder::new();
/// let start = b.add_node_after(WorkUnit::service("start"), &[]).unwrap();
/// let dig = b.add_node_after(WorkUnit::new("dig"), &[start]).unwrap();
/// let pour = b
///     .add_node(WorkUnit::new("pour"), [(dig, 0.0, EdgeType::InseparableFinishStart)])
///     .unwrap();
/// let finish = b.add_node_after(WorkUnit::service("finish"), &[pour]).unwrap();
///
/// let graph = b.build(start, finish).unwrap();
/// assert_eq!(graph.len(), 4);
/// let dig = graph.node("dig").unwrap();
/// assert_eq!(dig.inseparable_chain().map(|c| c.len()), Some(2));
/// ```
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    nodes: Vec<RawNode>,
    ids: HashMap<String, NodeIndex>,
}

#[derive(Debug, Clone)]
struct RawNode {
    work_unit: WorkUnit,
    parent_edges: Vec<GraphEdge>,
    children_edges: Vec<GraphEdge>,
    parents: Vec<NodeIndex>,
    children: Vec<NodeIndex>,
}

impl GraphBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of nodes added so far.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether no node was added.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Builder index of a previously added work id.
    pub fn index_of(&self, id: &str) -> Option<NodeIndex> {
        self.ids.get(id).copied()
    }

    /// Adds a node with explicit `(parent, lag, edge_type)` triples.
    ///
    /// # Errors
    /// `Structural` when the work id is already present or a parent index
    /// was not returned by this builder.
    pub fn add_node<I>(&mut self, work_unit: WorkUnit, parents: I) -> Result<NodeIndex>
    where
        I: IntoIterator<Item = (NodeIndex, f64, EdgeType)>,
    {
        if self.ids.contains_key(&work_unit.id) {
            return Err(Error::Structural(format!(
                "duplicate work id '{}'",
                work_unit.id
            )));
        }

        let index = NodeIndex::new(self.nodes.len());
        let edges: Vec<GraphEdge> = parents
            .into_iter()
            .map(|(parent, lag, edge_type)| GraphEdge::new(parent, index, lag, edge_type))
            .collect();
        if let Some(bad) = edges.iter().find(|e| e.start.index() >= self.nodes.len()) {
            return Err(Error::Structural(format!(
                "work '{}' references unknown parent {}",
                work_unit.id, bad.start
            )));
        }

        let mut node = RawNode {
            work_unit,
            parent_edges: Vec::with_capacity(edges.len()),
            children_edges: Vec::new(),
            parents: Vec::new(),
            children: Vec::new(),
        };
        for edge in edges {
            let parent = &mut self.nodes[edge.start.index()];
            parent.children_edges.push(edge);
            if edge.is_dependency() {
                parent.children.push(index);
                node.parents.push(edge.start);
            }
            node.parent_edges.push(edge);
        }

        self.ids.insert(node.work_unit.id.clone(), index);
        self.nodes.push(node);
        Ok(index)
    }

    /// Adds a node after bare parents (finish-start, default lag).
    pub fn add_node_after(
        &mut self,
        work_unit: WorkUnit,
        parents: &[NodeIndex],
    ) -> Result<NodeIndex> {
        self.add_node(
            work_unit,
            parents
                .iter()
                .map(|&p| (p, DEFAULT_LAG, EdgeType::FinishStart)),
        )
    }

    /// Freezes the graph rooted at `start`.
    ///
    /// Nodes not reachable from `start` through dependency edges are left
    /// out, as are edges touching them. Resulting node indices follow the
    /// topological order, not the insertion order.
    ///
    /// # Errors
    /// `Structural` when `start`/`finish` are unknown, `finish` is not
    /// reachable, a reachable node depends on an unreachable one, a node
    /// has more than one inseparable child or parent, or an inseparable
    /// chain depends on one of its own descendants.
    pub fn build(self, start: NodeIndex, finish: NodeIndex) -> Result<WorkGraph> {
        for endpoint in [start, finish] {
            if endpoint.index() >= self.nodes.len() {
                return Err(Error::Structural(format!("unknown endpoint {endpoint}")));
            }
        }

        let mut traversal = Traversal::new(&self, start, true);
        let order: Vec<NodeIndex> = traversal.by_ref().collect();
        if traversal.stalled() {
            return Err(Error::Structural(format!(
                "works below '{}' depend on works unreachable from it",
                self.nodes[start.index()].work_unit.id
            )));
        }

        let mut remap: Vec<Option<NodeIndex>> = vec![None; self.nodes.len()];
        for (position, old) in order.iter().enumerate() {
            remap[old.index()] = Some(NodeIndex::new(position));
        }
        if remap[finish.index()].is_none() {
            return Err(Error::Structural(format!(
                "finish '{}' is not reachable from start '{}'",
                self.nodes[finish.index()].work_unit.id,
                self.nodes[start.index()].work_unit.id
            )));
        }
        for old in &order {
            self.check_inseparable_fan(*old)?;
        }

        let translate = |e: &GraphEdge| -> Option<GraphEdge> {
            Some(GraphEdge {
                start: remap[e.start.index()]?,
                finish: remap[e.finish.index()]?,
                ..*e
            })
        };

        let mut raw_nodes: Vec<Option<RawNode>> = self.nodes.into_iter().map(Some).collect();
        let mut nodes = Vec::with_capacity(order.len());
        let mut dropped = 0usize;
        for (position, old) in order.iter().enumerate() {
            let raw = raw_nodes[old.index()]
                .take()
                .ok_or_else(|| Error::Structural(format!("node {old} visited twice")))?;
            let parent_edges: Vec<GraphEdge> =
                raw.parent_edges.iter().filter_map(translate).collect();
            let children_edges: Vec<GraphEdge> =
                raw.children_edges.iter().filter_map(translate).collect();
            dropped += raw.parent_edges.len() - parent_edges.len();
            dropped += raw.children_edges.len() - children_edges.len();
            nodes.push(GraphNode::new(
                NodeIndex::new(position),
                raw.work_unit,
                parent_edges,
                children_edges,
            ));
        }
        if dropped > 0 {
            warn!(dropped, "dropped edges touching works unreachable from start");
        }

        let chains = link_inseparable_chains(&mut nodes)?;
        check_chains_schedulable(&nodes)?;

        let mut adjacency = AdjacencyMatrix::new(nodes.len());
        for node in &nodes {
            let weight = node.work_unit().max_volume().unwrap_or(DEFAULT_EDGE_WEIGHT);
            for &child in node.children() {
                adjacency.insert(node.index(), child, weight);
            }
        }

        let index_by_id: HashMap<String, NodeIndex> = nodes
            .iter()
            .map(|n| (n.id().to_string(), n.index()))
            .collect();

        debug!(
            nodes = nodes.len(),
            edges = adjacency.nnz(),
            chains,
            "work graph built"
        );

        Ok(WorkGraph::from_parts(
            NodeIndex::new(0),
            remap[finish.index()].unwrap_or(NodeIndex::new(0)),
            nodes,
            adjacency,
            index_by_id,
        ))
    }

    fn check_inseparable_fan(&self, index: NodeIndex) -> Result<()> {
        let raw = &self.nodes[index.index()];
        let is_inseparable = |e: &&GraphEdge| e.edge_type == EdgeType::InseparableFinishStart;
        if raw.children_edges.iter().filter(is_inseparable).count() > 1 {
            return Err(Error::Structural(format!(
                "work '{}' has more than one inseparable child",
                raw.work_unit.id
            )));
        }
        if raw.parent_edges.iter().filter(is_inseparable).count() > 1 {
            return Err(Error::Structural(format!(
                "work '{}' has more than one inseparable parent",
                raw.work_unit.id
            )));
        }
        Ok(())
    }
}

/// Stores the chain on every chain head; returns the number of chains.
fn link_inseparable_chains(nodes: &mut [GraphNode]) -> Result<usize> {
    let mut chains = 0;
    for i in 0..nodes.len() {
        if !nodes[i].is_chain_head() {
            continue;
        }
        let mut chain = vec![nodes[i].index()];
        let mut next = nodes[i].inseparable_son();
        while let Some(son) = next {
            if chain.len() >= nodes.len() {
                return Err(Error::Structural(format!(
                    "inseparable cycle through work '{}'",
                    nodes[i].id()
                )));
            }
            chain.push(son);
            next = nodes[son.index()].inseparable_son();
        }
        nodes[i].set_inseparable_chain(chain);
        chains += 1;
    }
    Ok(chains)
}

/// Rejects graphs where a chain member waits on a descendant of an earlier
/// member outside the chain; such a chain can never run back-to-back.
fn check_chains_schedulable(nodes: &[GraphNode]) -> Result<()> {
    let n = nodes.len();
    let mut unit_of: Vec<usize> = (0..n).collect();
    for node in nodes {
        if let Some(chain) = node.inseparable_chain() {
            for member in chain {
                unit_of[member.index()] = node.index().index();
            }
        }
    }

    let mut pending = vec![0usize; n];
    for (i, node) in nodes.iter().enumerate() {
        let unit = unit_of[i];
        pending[unit] += node
            .parents()
            .iter()
            .filter(|p| unit_of[p.index()] != unit)
            .count();
    }

    let mut ready: Vec<usize> = (0..n).filter(|&i| unit_of[i] == i && pending[i] == 0).collect();
    let mut placed = 0usize;
    while let Some(unit) = ready.pop() {
        for member in nodes[unit].inseparable_chain_with_self() {
            placed += 1;
            for child in nodes[member.index()].children() {
                let child_unit = unit_of[child.index()];
                if child_unit == unit {
                    continue;
                }
                pending[child_unit] -= 1;
                if pending[child_unit] == 0 {
                    ready.push(child_unit);
                }
            }
        }
    }

    if placed < n {
        let stuck = (0..n)
            .find(|&i| unit_of[i] == i && pending[i] > 0)
            .unwrap_or(0);
        return Err(Error::Structural(format!(
            "inseparable chain of '{}' depends on its own descendants",
            nodes[stuck].id()
        )));
    }
    Ok(())
}

impl Adjacency for GraphBuilder {
    fn node_count(&self) -> usize {
        self.nodes.len()
    }

    fn dependency_parents(&self, node: NodeIndex) -> &[NodeIndex] {
        &self.nodes[node.index()].parents
    }

    fn dependency_children(&self, node: NodeIndex) -> &[NodeIndex] {
        &self.nodes[node.index()].children
    }
}
