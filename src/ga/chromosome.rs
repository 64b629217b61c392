//! Fixed-layout chromosome for project scheduling GA.
//!
//! # Encoding
//!
//! One column per graph node, in the graph's topological index order:
//! - **order**: permutation of node indices, read as a scheduling priority
//!   list by the decoder.
//! - **resources**: rows = resource kind, columns = node; workers of each
//!   kind assigned to each node.
//! - **contractors**: contractor index per node (the allocation context
//!   telling which border row the node's column is checked against).
//! - **borders**: rows = contractor, columns = resource kind; the most
//!   workers of a kind that contractor may supply at once.

use rand::prelude::IndexedRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ChromosomeCodec;
use crate::error::Result;

/// A candidate schedule in genetic-search form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chromosome {
    /// Node indices in scheduling priority order.
    pub order: Vec<usize>,
    /// `resources[kind][node]`.
    pub resources: Vec<Vec<u32>>,
    /// `contractors[node]`.
    pub contractors: Vec<usize>,
    /// `borders[contractor][kind]`.
    pub borders: Vec<Vec<u32>>,
}

impl Chromosome {
    /// Number of node columns.
    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    /// Number of resource kind rows.
    pub fn kind_count(&self) -> usize {
        self.resources.len()
    }

    /// Number of contractor rows in the border matrix.
    pub fn contractor_count(&self) -> usize {
        self.borders.len()
    }

    /// Workers of `kind` assigned to `node`.
    pub fn allocation(&self, kind: usize, node: usize) -> u32 {
        self.resources
            .get(kind)
            .and_then(|row| row.get(node))
            .copied()
            .unwrap_or(0)
    }

    /// Whether `order` holds every index in `0..node_count` exactly once.
    pub fn is_permutation(&self) -> bool {
        let mut seen = vec![false; self.order.len()];
        self.order.iter().all(|&i| match seen.get_mut(i) {
            Some(slot) if !*slot => {
                *slot = true;
                true
            }
            _ => false,
        })
    }

    /// Generates a random chromosome that decodes without error.
    ///
    /// The order is a random topological order of the graph. Each
    /// inseparable chain (or lone node) gets one random contractor able to
    /// staff all of its members, and every required kind a crew drawn
    /// uniformly from `[min_count, min(max_count, capacity)]`.
    ///
    /// # Errors
    /// `NoSuitableContractor` when no contractor covers a work's minimum
    /// crew.
    pub fn random<R: Rng>(codec: &ChromosomeCodec<'_>, rng: &mut R) -> Result<Self> {
        let graph = codec.graph();
        let n = graph.len();

        let mut pending: Vec<usize> = graph.nodes().iter().map(|v| v.parents().len()).collect();
        let mut ready: Vec<usize> = (0..n).filter(|&i| pending[i] == 0).collect();
        let mut order = Vec::with_capacity(n);
        while !ready.is_empty() {
            let pick = ready.swap_remove(rng.random_range(0..ready.len()));
            order.push(pick);
            for child in graph.nodes()[pick].children() {
                pending[child.index()] -= 1;
                if pending[child.index()] == 0 {
                    ready.push(child.index());
                }
            }
        }

        let borders = codec.borders();
        let mut resources = vec![vec![0u32; n]; codec.kinds().len()];
        let mut contractors = vec![0usize; n];
        for node in graph.nodes().iter().filter(|v| !v.is_inseparable_son()) {
            let suitable = codec.suitable_contractors(node.index())?;
            let contractor = suitable.choose(rng).copied().unwrap_or(0);
            for &member in node.inseparable_chain_with_self() {
                contractors[member.index()] = contractor;
                for req in &graph[member].work_unit().worker_reqs {
                    let Some(kind) = codec.kind_index(&req.kind) else {
                        continue;
                    };
                    let high = req.max_count.min(borders[contractor][kind]).max(req.min_count);
                    resources[kind][member.index()] = rng.random_range(req.min_count..=high);
                }
            }
        }

        Ok(Self {
            order,
            resources,
            contractors,
            borders,
        })
    }
}
