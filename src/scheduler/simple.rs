//! Serial baseline scheduler.
//!
//! # Algorithm
//!
//! 1. Take nodes in topological index order as the priority list.
//! 2. Give each unit (lone node or inseparable chain) the first contractor
//!    able to staff every member with its minimum crew.
//! 3. Staff each required kind with `min(max_count, capacity)` workers.
//! 4. Place units with the chromosome decoder.
//!
//! # Complexity
//! O(n * c * k) to build the chromosome, where n = nodes, c = contractors,
//! k = resource kinds; placement is the decoder's cost.

use tracing::debug;

use super::Scheduler;
use crate::error::Result;
use crate::ga::{Chromosome, ChromosomeCodec};
use crate::graph::WorkGraph;
use crate::models::{Contractor, Schedule, Time};

/// Topological-priority scheduler with maximal crews.
///
/// # Example
///
/// ```
/// use u_rcpsp::graph::GraphBuilder;
/// use u_rcpsp::models::{Contractor, WorkUnit, WorkerReq};
/// use u_rcpsp::scheduler::{Scheduler, SimpleScheduler};
///
/// let mut b = GraphBuilder::new();
/// let s = b.add_node_after(WorkUnit::service("start"), &[]).unwrap();
/// let a = b
///     .add_node_after(WorkUnit::new("A").with_req(WorkerReq::new("worker", 10.0).with_counts(1, 5)), &[s])
///     .unwrap();
/// let f = b.add_node_after(WorkUnit::service("finish"), &[a]).unwrap();
/// let graph = b.build(s, f).unwrap();
///
/// let contractors = vec![Contractor::new("C1").with_workers("worker", 5)];
/// let schedule = SimpleScheduler::new().schedule(&graph, &contractors).unwrap();
/// assert_eq!(schedule.get("A").unwrap().finish, 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimpleScheduler {
    start_time: Time,
}

impl SimpleScheduler {
    /// Creates a scheduler starting at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the project start time.
    pub fn with_start_time(mut self, start_time: Time) -> Self {
        self.start_time = start_time;
        self
    }

    /// Builds the baseline chromosome for `codec`.
    ///
    /// Useful as a seed individual for genetic search.
    ///
    /// # Errors
    /// `NoSuitableContractor` when no contractor covers some unit's
    /// minimum crew.
    pub fn chromosome(&self, codec: &ChromosomeCodec<'_>) -> Result<Chromosome> {
        let graph = codec.graph();
        let mut chromosome = codec.empty_chromosome();

        for node in graph.nodes().iter().filter(|v| !v.is_inseparable_son()) {
            let suitable = codec.suitable_contractors(node.index())?;
            let contractor = suitable[0];
            for &member in node.inseparable_chain_with_self() {
                let i = member.index();
                chromosome.contractors[i] = contractor;
                for req in &graph[member].work_unit().worker_reqs {
                    let Some(kind) = codec.kind_index(&req.kind) else {
                        continue;
                    };
                    let capacity = chromosome.borders[contractor][kind];
                    chromosome.resources[kind][i] = req.max_count.min(capacity).max(req.min_count);
                }
            }
        }
        Ok(chromosome)
    }
}

impl Scheduler for SimpleScheduler {
    fn schedule(&self, graph: &WorkGraph, contractors: &[Contractor]) -> Result<Schedule> {
        let codec = ChromosomeCodec::new(graph, contractors).with_start_time(self.start_time);
        let chromosome = self.chromosome(&codec)?;
        let schedule = codec.decode(&chromosome)?;
        debug!(
            works = schedule.len(),
            execution_time = %schedule.execution_time(),
            "baseline schedule built"
        );
        Ok(schedule)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::graph::{EdgeType, GraphBuilder};
    use crate::models::{WorkUnit, WorkerReq};
    use crate::validation::validate_schedule;

    fn req(kind: &str, volume: f64) -> WorkerReq {
        WorkerReq::new(kind, volume).with_counts(1, 4)
    }

    fn sample_graph() -> WorkGraph {
        let mut b = GraphBuilder::new();
        let s = b.add_node_after(WorkUnit::service("start"), &[]).unwrap();
        let dig = b
            .add_node_after(WorkUnit::new("dig").with_req(req("worker", 8.0)), &[s])
            .unwrap();
        let pour = b
            .add_node(
                WorkUnit::new("pour").with_req(req("worker", 4.0)),
                [(dig, 0.0, EdgeType::InseparableFinishStart)],
            )
            .unwrap();
        let wire = b
            .add_node_after(WorkUnit::new("wire").with_req(req("electrician", 6.0)), &[s])
            .unwrap();
        let f = b.add_node_after(WorkUnit::service("finish"), &[pour, wire]).unwrap();
        b.build(s, f).unwrap()
    }

    #[test]
    fn test_schedule_is_valid() {
        let graph = sample_graph();
        let contractors = vec![
            Contractor::new("builders").with_workers("worker", 4),
            Contractor::new("sparks").with_workers("electrician", 3),
        ];
        let schedule = SimpleScheduler::new().schedule(&graph, &contractors).unwrap();

        assert_eq!(schedule.len(), graph.len());
        assert!(validate_schedule(&schedule, &graph, &contractors).is_ok());
        assert_eq!(schedule.get("wire").unwrap().contractor_id, "sparks");
        assert_eq!(schedule.get("dig").unwrap().contractor_id, "builders");
        assert_eq!(schedule.get("pour").unwrap().contractor_id, "builders");
    }

    #[test]
    fn test_maximal_crews() {
        let graph = sample_graph();
        let contractors = vec![Contractor::new("all")
            .with_workers("worker", 2)
            .with_workers("electrician", 9)];
        let schedule = SimpleScheduler::new().schedule(&graph, &contractors).unwrap();

        // capped by capacity
        assert_eq!(schedule.get("dig").unwrap().count_of("worker"), 2);
        assert_eq!(schedule.get("dig").unwrap().finish, 4);
        // capped by max_count
        assert_eq!(schedule.get("wire").unwrap().count_of("electrician"), 4);
        assert_eq!(schedule.get("wire").unwrap().finish, 2);
    }

    #[test]
    fn test_start_time() {
        let graph = sample_graph();
        let contractors = vec![Contractor::new("all")
            .with_workers("worker", 4)
            .with_workers("electrician", 4)];
        let schedule = SimpleScheduler::new()
            .with_start_time(Time::new(50))
            .schedule(&graph, &contractors)
            .unwrap();
        assert!(schedule.works().iter().all(|w| w.start >= 50));
    }

    #[test]
    fn test_no_suitable_contractor() {
        let graph = sample_graph();
        let contractors = vec![Contractor::new("builders").with_workers("worker", 4)];
        let err = SimpleScheduler::new().schedule(&graph, &contractors).unwrap_err();
        assert!(matches!(err, Error::NoSuitableContractor(id) if id == "wire"));
    }
}
