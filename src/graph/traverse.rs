//! Breadth-first traversal over dependency edges.

use std::collections::VecDeque;

use super::NodeIndex;

/// Dependency structure a [`Traversal`] walks.
///
/// Implemented by [`WorkGraph`](super::WorkGraph) and, during assembly, by
/// [`GraphBuilder`](super::GraphBuilder).
pub trait Adjacency {
    /// Number of arena slots.
    fn node_count(&self) -> usize;
    /// Dependency predecessors of `node`.
    fn dependency_parents(&self, node: NodeIndex) -> &[NodeIndex];
    /// Dependency successors of `node`.
    fn dependency_children(&self, node: NodeIndex) -> &[NodeIndex];
}

/// Lazy breadth-first walk from one node down its dependency children.
///
/// Each reachable node is yielded once. In topological mode a node is put
/// back at the end of the queue until every dependency parent has been
/// yielded. When no queued node can make progress (a cycle, or a parent
/// not reachable from the origin) the walk ends early and
/// [`Traversal::stalled`] reports it.
#[derive(Debug)]
pub struct Traversal<'a, A: Adjacency + ?Sized> {
    graph: &'a A,
    queue: VecDeque<NodeIndex>,
    visited: Vec<bool>,
    topologically: bool,
    deferrals: usize,
    stalled: bool,
}

impl<'a, A: Adjacency + ?Sized> Traversal<'a, A> {
    /// Starts a walk at `from`.
    pub fn new(graph: &'a A, from: NodeIndex, topologically: bool) -> Self {
        Self {
            graph,
            queue: VecDeque::from([from]),
            visited: vec![false; graph.node_count()],
            topologically,
            deferrals: 0,
            stalled: false,
        }
    }

    /// Whether the walk stopped with nodes still blocked on parents.
    pub fn stalled(&self) -> bool {
        self.stalled
    }

    fn is_blocked(&self, node: NodeIndex) -> bool {
        self.graph
            .dependency_parents(node)
            .iter()
            .any(|p| !self.visited[p.index()])
    }
}

impl<A: Adjacency + ?Sized> Iterator for Traversal<'_, A> {
    type Item = NodeIndex;

    fn next(&mut self) -> Option<NodeIndex> {
        while let Some(node) = self.queue.pop_front() {
            if self.visited[node.index()] {
                self.deferrals = 0;
                continue;
            }
            if self.topologically && self.is_blocked(node) {
                self.queue.push_back(node);
                self.deferrals += 1;
                if self.deferrals >= self.queue.len() {
                    self.stalled = true;
                    self.queue.clear();
                    return None;
                }
                continue;
            }
            self.visited[node.index()] = true;
            self.deferrals = 0;
            self.queue
                .extend(self.graph.dependency_children(node).iter().copied());
            return Some(node);
        }
        None
    }
}
