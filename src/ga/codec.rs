//! Schedule ⇄ chromosome conversion.
//!
//! # Decoding
//!
//! Decoding is a serial schedule-generation scheme driven by the order
//! vector: at each step the earliest-ordered unit whose dependency parents
//! are all scheduled is placed. A unit is a lone node or a whole
//! inseparable chain led by its head; chain members run back-to-back on
//! the head's contractor. Each unit starts at the earliest time that
//! satisfies every incoming dependency (parent finish plus lag) and fits
//! the contractor's remaining capacity, where capacity is the chromosome's
//! border row.
//!
//! # Reference
//! Kolisch (1996), "Serial and parallel resource-constrained project
//! scheduling methods revisited"

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, trace, warn};

use super::timeline::{Segment, Timeline};
use super::Chromosome;
use crate::error::{Error, Result};
use crate::graph::{EdgeType, NodeIndex, WorkGraph};
use crate::models::{
    Contractor, DefaultWorkTimeEstimator, Schedule, ScheduledWork, Time, WorkTimeEstimator,
    WorkerAssignment,
};

/// Converts between [`Schedule`]s and [`Chromosome`]s for one graph and
/// one set of contractors.
///
/// Resource kinds are the sorted union of the contractors' worker kinds
/// and the kinds required by graph nodes; their position is the row index
/// of the resource matrix and the column index of the border matrix.
///
/// The codec only borrows its inputs and keeps no state between calls, so
/// one codec can decode many chromosomes in parallel.
///
/// # Example
///
/// ```
/// use u_rcpsp::ga::ChromosomeCodec;
/// use u_rcpsp::graph::GraphBuilder;
/// use u_rcpsp::models::{Contractor, WorkUnit, WorkerReq};
///
/// let mut b = GraphBuilder::new();
/// let s = b.add_node_after(WorkUnit::service("start"), &[]).unwrap();
/// let a = b
///     .add_node_after(WorkUnit::new("A").with_req(WorkerReq::new("worker", 4.0).with_counts(1, 4)), &[s])
///     .unwrap();
/// let f = b.add_node_after(WorkUnit::service("finish"), &[a]).unwrap();
/// let graph = b.build(s, f).unwrap();
/// let contractors = vec![Contractor::new("C1").with_workers("worker", 5)];
///
/// let codec = ChromosomeCodec::new(&graph, &contractors);
/// let mut chromosome = codec.empty_chromosome();
/// chromosome.resources[0][1] = 2;
///
/// let schedule = codec.decode(&chromosome).unwrap();
/// assert_eq!(schedule.get("A").unwrap().finish, 2);
/// ```
pub struct ChromosomeCodec<'a> {
    graph: &'a WorkGraph,
    contractors: &'a [Contractor],
    kinds: Vec<String>,
    kind_index: HashMap<String, usize>,
    contractor_index: HashMap<&'a str, usize>,
    start_time: Time,
    estimator: &'a dyn WorkTimeEstimator,
}

impl<'a> ChromosomeCodec<'a> {
    /// Creates a codec starting the project at time zero with the default
    /// duration model.
    pub fn new(graph: &'a WorkGraph, contractors: &'a [Contractor]) -> Self {
        let mut kinds: Vec<String> = contractors
            .iter()
            .flat_map(|c| c.workers.keys().cloned())
            .chain(
                graph
                    .nodes()
                    .iter()
                    .flat_map(|n| n.work_unit().worker_reqs.iter().map(|r| r.kind.clone())),
            )
            .collect();
        kinds.sort();
        kinds.dedup();

        let kind_index = kinds
            .iter()
            .enumerate()
            .map(|(i, k)| (k.clone(), i))
            .collect();
        let contractor_index = contractors
            .iter()
            .enumerate()
            .map(|(i, c)| (c.id.as_str(), i))
            .collect();

        Self {
            graph,
            contractors,
            kinds,
            kind_index,
            contractor_index,
            start_time: Time::zero(),
            estimator: &DefaultWorkTimeEstimator,
        }
    }

    /// Sets the project start time used by [`decode`](Self::decode).
    pub fn with_start_time(mut self, start_time: Time) -> Self {
        self.start_time = start_time;
        self
    }

    /// Sets the duration model.
    pub fn with_estimator(mut self, estimator: &'a dyn WorkTimeEstimator) -> Self {
        self.estimator = estimator;
        self
    }

    /// Graph the codec works against.
    pub fn graph(&self) -> &'a WorkGraph {
        self.graph
    }

    /// Contractors in border-row order.
    pub fn contractors(&self) -> &'a [Contractor] {
        self.contractors
    }

    /// Resource kinds in resource-row order.
    pub fn kinds(&self) -> &[String] {
        &self.kinds
    }

    /// Row of a resource kind.
    pub fn kind_index(&self, kind: &str) -> Option<usize> {
        self.kind_index.get(kind).copied()
    }

    /// Current contractor capacities as a border matrix.
    pub fn borders(&self) -> Vec<Vec<u32>> {
        self.contractors
            .iter()
            .map(|c| self.kinds.iter().map(|k| c.capacity(k)).collect())
            .collect()
    }

    /// Chromosome with topological order, contractor 0 everywhere, no
    /// workers and the current borders.
    pub fn empty_chromosome(&self) -> Chromosome {
        let n = self.graph.len();
        Chromosome {
            order: (0..n).collect(),
            resources: vec![vec![0; n]; self.kinds.len()],
            contractors: vec![0; n],
            borders: self.borders(),
        }
    }

    /// Contractors able to staff every member of the unit led by `head`
    /// with at least the minimum crew.
    ///
    /// # Errors
    /// `NoSuitableContractor` when the list would be empty.
    pub fn suitable_contractors(&self, head: NodeIndex) -> Result<Vec<usize>> {
        let members = self.graph[head].inseparable_chain_with_self();
        let suitable: Vec<usize> = self
            .contractors
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                members.iter().all(|&m| {
                    self.graph[m]
                        .work_unit()
                        .worker_reqs
                        .iter()
                        .all(|req| c.capacity(&req.kind) >= req.min_count)
                })
            })
            .map(|(i, _)| i)
            .collect();
        if suitable.is_empty() {
            return Err(Error::NoSuitableContractor(self.graph[head].id().to_string()));
        }
        Ok(suitable)
    }

    /// Encodes a schedule.
    ///
    /// The order vector sorts nodes by scheduled start, ties broken by
    /// topological index. Works without requirements may name a contractor
    /// the codec does not know; they are attributed to contractor 0.
    ///
    /// # Errors
    /// `NotFound` when a graph node is missing from the schedule, or a
    /// staffed work names an unknown contractor or resource kind.
    pub fn encode(&self, schedule: &Schedule) -> Result<Chromosome> {
        let n = self.graph.len();
        let mut chromosome = self.empty_chromosome();
        let mut starts = Vec::with_capacity(n);

        for node in self.graph.nodes() {
            let i = node.index().index();
            let scheduled = schedule
                .get(node.id())
                .ok_or_else(|| Error::NotFound(format!("work '{}' in schedule", node.id())))?;
            starts.push(scheduled.start);

            let known = self.contractor_index.get(scheduled.contractor_id.as_str());
            chromosome.contractors[i] = match known {
                Some(&c) => c,
                None if node.work_unit().worker_reqs.is_empty() => 0,
                None => {
                    return Err(Error::NotFound(format!(
                        "contractor '{}' of work '{}'",
                        scheduled.contractor_id,
                        node.id()
                    )))
                }
            };
            for worker in &scheduled.workers {
                let kind = self
                    .kind_index(&worker.kind)
                    .ok_or_else(|| Error::NotFound(format!("resource kind '{}'", worker.kind)))?;
                chromosome.resources[kind][i] += worker.count;
            }
        }

        chromosome.order.sort_by_key(|&i| (starts[i], i));
        Ok(chromosome)
    }

    /// Decodes a chromosome into a schedule.
    ///
    /// Accepts any allocation within the borders, not only ones produced by
    /// [`encode`](Self::encode). Allocations of kinds a work does not
    /// require are ignored; required allocations below `min_count` are
    /// raised to it.
    ///
    /// Every work, service works included, is placed on a contractor, so
    /// the codec needs at least one.
    ///
    /// # Errors
    /// `InvalidChromosome` when the codec has no contractors, the matrix
    /// shapes do not match the graph and kinds, `order` is not a
    /// permutation, a contractor index is out of range, a (raised)
    /// allocation exceeds its border, or lags between members of one
    /// inseparable chain cannot hold with the decoded durations.
    pub fn decode(&self, chromosome: &Chromosome) -> Result<Schedule> {
        self.check_shape(chromosome)?;
        let n = self.graph.len();
        let nodes = self.graph.nodes();

        let mut unit_of: Vec<usize> = (0..n).collect();
        for node in nodes {
            if let Some(chain) = node.inseparable_chain() {
                for member in chain {
                    unit_of[member.index()] = node.index().index();
                }
            }
        }

        let crews = self.crews(chromosome, &unit_of)?;

        let mut position = vec![0usize; n];
        for (p, &i) in chromosome.order.iter().enumerate() {
            position[i] = p;
        }
        let mut pending = vec![0usize; n];
        for node in nodes {
            let unit = unit_of[node.index().index()];
            pending[unit] += node
                .parents()
                .iter()
                .filter(|p| unit_of[p.index()] != unit)
                .count();
        }
        let mut ready: BTreeSet<usize> = (0..n)
            .filter(|&i| unit_of[i] == i && pending[i] == 0)
            .map(|i| position[i])
            .collect();

        let mut timeline = Timeline::new(chromosome.borders.clone());
        let mut finish: Vec<Option<Time>> = vec![None; n];
        let mut scheduled = Vec::with_capacity(n);

        while let Some(p) = ready.pop_first() {
            let head = chromosome.order[p];
            let contractor = chromosome.contractors[head];
            let chain = nodes[head].inseparable_chain_with_self();

            let mut offset = Time::zero();
            let mut segments = Vec::with_capacity(chain.len());
            for &member in chain {
                let crew = &crews[member.index()];
                let duration = self
                    .estimator
                    .estimate(nodes[member.index()].work_unit(), &crew.workers);
                segments.push(Segment {
                    offset,
                    duration,
                    demand: &crew.demand,
                });
                offset += duration;
            }

            // Inside a unit only the chain links are enforced by placement;
            // other edges between members must already hold at their offsets.
            for (segment, &member) in segments.iter().zip(chain) {
                for edge in nodes[member.index()].edges_to() {
                    if !edge.is_dependency()
                        || edge.edge_type == EdgeType::InseparableFinishStart
                        || unit_of[edge.start.index()] != head
                    {
                        continue;
                    }
                    let Some(k) = chain.iter().position(|&m| m == edge.start) else {
                        continue;
                    };
                    let parent_end = segments[k].offset + segments[k].duration;
                    if segment.offset < parent_end + edge.lag_time() {
                        return Err(Error::InvalidChromosome(format!(
                            "work '{}' cannot wait {} after '{}' inside its inseparable chain",
                            nodes[member.index()].id(),
                            edge.lag_time(),
                            nodes[edge.start.index()].id()
                        )));
                    }
                }
            }

            let mut not_before = self.start_time;
            for (segment, &member) in segments.iter().zip(chain) {
                for edge in nodes[member.index()].edges_to() {
                    if !edge.is_dependency() || unit_of[edge.start.index()] == head {
                        continue;
                    }
                    let parent_finish = finish[edge.start.index()].ok_or_else(|| {
                        Error::InvalidChromosome(format!(
                            "work '{}' placed before its parent",
                            nodes[member.index()].id()
                        ))
                    })?;
                    not_before = not_before.max(parent_finish + edge.lag_time() - segment.offset);
                }
            }

            let start = timeline.earliest_start(contractor, not_before, &segments);
            for (segment, &member) in segments.iter().zip(chain) {
                let work_start = start + segment.offset;
                let work_finish = work_start + segment.duration;
                timeline.reserve(contractor, work_start, work_finish, segment.demand);
                finish[member.index()] = Some(work_finish);

                let work = &nodes[member.index()];
                trace!(
                    work = work.id(),
                    start = %work_start,
                    finish = %work_finish,
                    contractor,
                    "placed"
                );
                scheduled.push(ScheduledWork {
                    work_id: work.id().to_string(),
                    contractor_id: self.contractors[contractor].id.clone(),
                    start: work_start,
                    finish: work_finish,
                    workers: crews[member.index()].workers.clone(),
                });
            }

            for &member in chain {
                for child in nodes[member.index()].children() {
                    let unit = unit_of[child.index()];
                    if unit == head {
                        continue;
                    }
                    pending[unit] -= 1;
                    if pending[unit] == 0 {
                        ready.insert(position[unit]);
                    }
                }
            }
        }

        if scheduled.len() != n {
            return Err(Error::InvalidChromosome(format!(
                "only {} of {} works could be placed",
                scheduled.len(),
                n
            )));
        }

        let schedule = Schedule::from_scheduled_works(scheduled);
        debug!(
            works = schedule.len(),
            execution_time = %schedule.execution_time(),
            "chromosome decoded"
        );
        Ok(schedule)
    }

    /// Decodes a batch of chromosomes and returns the execution time of
    /// each, in input order. A chromosome that fails to decode yields its
    /// error without affecting the rest of the batch.
    pub fn evaluate(&self, chromosomes: &[Chromosome]) -> Vec<Result<Time>> {
        let fitness: Vec<Result<Time>> = chromosomes
            .iter()
            .map(|ch| self.decode(ch).map(|schedule| schedule.execution_time()))
            .collect();
        debug!(
            chromosomes = chromosomes.len(),
            failed = fitness.iter().filter(|r| r.is_err()).count(),
            "batch evaluated"
        );
        fitness
    }

    fn check_shape(&self, chromosome: &Chromosome) -> Result<()> {
        let n = self.graph.len();
        let kinds = self.kinds.len();
        let invalid = |msg: String| Err(Error::InvalidChromosome(msg));

        if self.contractors.is_empty() {
            return invalid("no contractors to place works on".into());
        }

        if chromosome.order.len() != n || chromosome.contractors.len() != n {
            return invalid(format!(
                "expected {} node columns, got order {} and contractors {}",
                n,
                chromosome.order.len(),
                chromosome.contractors.len()
            ));
        }
        if chromosome.resources.len() != kinds
            || chromosome.resources.iter().any(|row| row.len() != n)
        {
            return invalid(format!("resource matrix must be {kinds} x {n}"));
        }
        if chromosome.borders.len() != self.contractors.len()
            || chromosome.borders.iter().any(|row| row.len() != kinds)
        {
            return invalid(format!(
                "border matrix must be {} x {}",
                self.contractors.len(),
                kinds
            ));
        }
        if !chromosome.is_permutation() {
            return invalid("order is not a permutation of node indices".into());
        }
        if let Some(&c) = chromosome.contractors.iter().find(|&&c| c >= self.contractors.len()) {
            return invalid(format!("contractor index {c} out of range"));
        }
        Ok(())
    }

    /// Validated crew of every node, checked against the border row of the
    /// contractor running its unit.
    fn crews(&self, chromosome: &Chromosome, unit_of: &[usize]) -> Result<Vec<Crew>> {
        self.graph
            .nodes()
            .iter()
            .map(|node| {
                let i = node.index().index();
                let contractor = chromosome.contractors[unit_of[i]];
                let mut crew = Crew {
                    workers: Vec::with_capacity(node.work_unit().worker_reqs.len()),
                    demand: vec![0; self.kinds.len()],
                };
                for req in &node.work_unit().worker_reqs {
                    let Some(kind) = self.kind_index(&req.kind) else {
                        continue;
                    };
                    let allocated = chromosome.resources[kind][i];
                    let count = if allocated < req.min_count {
                        warn!(
                            work = node.id(),
                            kind = %req.kind,
                            allocated,
                            min_count = req.min_count,
                            "allocation raised to minimum crew"
                        );
                        req.min_count
                    } else {
                        allocated
                    };
                    let border = chromosome.borders[contractor][kind];
                    if count > border {
                        return Err(Error::InvalidChromosome(format!(
                            "work '{}' needs {} '{}' but contractor '{}' border is {}",
                            node.id(),
                            count,
                            req.kind,
                            self.contractors[contractor].id,
                            border
                        )));
                    }
                    crew.demand[kind] += count;
                    crew.workers.push(WorkerAssignment::new(req.kind.clone(), count));
                }
                Ok(crew)
            })
            .collect()
    }
}

#[derive(Debug, Clone)]
struct Crew {
    workers: Vec<WorkerAssignment>,
    demand: Vec<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphBuilder, DEFAULT_LAG};
    use crate::models::{WorkUnit, WorkerReq};

    fn req(volume: f64) -> WorkerReq {
        WorkerReq::new("worker", volume).with_counts(1, 5)
    }

    /// start → A → B → C → finish
    fn chain_graph() -> WorkGraph {
        let mut b = GraphBuilder::new();
        let s = b.add_node_after(WorkUnit::service("start"), &[]).unwrap();
        let a = b.add_node_after(WorkUnit::new("A").with_req(req(4.0)), &[s]).unwrap();
        let bb = b.add_node_after(WorkUnit::new("B").with_req(req(6.0)), &[a]).unwrap();
        let c = b.add_node_after(WorkUnit::new("C").with_req(req(2.0)), &[bb]).unwrap();
        let f = b.add_node_after(WorkUnit::service("finish"), &[c]).unwrap();
        b.build(s, f).unwrap()
    }

    /// start → {A, B} in parallel → finish, B ⇒ C inseparable, C → finish
    fn parallel_graph() -> WorkGraph {
        let mut b = GraphBuilder::new();
        let s = b.add_node_after(WorkUnit::service("start"), &[]).unwrap();
        let a = b.add_node_after(WorkUnit::new("A").with_req(req(6.0)), &[s]).unwrap();
        let bb = b.add_node_after(WorkUnit::new("B").with_req(req(4.0)), &[s]).unwrap();
        let c = b
            .add_node(
                WorkUnit::new("C").with_req(req(4.0)),
                [(bb, 0.0, EdgeType::InseparableFinishStart)],
            )
            .unwrap();
        let f = b
            .add_node(
                WorkUnit::service("finish"),
                [
                    (a, DEFAULT_LAG, EdgeType::FinishStart),
                    (c, DEFAULT_LAG, EdgeType::FinishStart),
                ],
            )
            .unwrap();
        b.build(s, f).unwrap()
    }

    fn contractors() -> Vec<Contractor> {
        vec![Contractor::new("C1").with_workers("worker", 5)]
    }

    fn uniform(codec: &ChromosomeCodec<'_>, count: u32) -> Chromosome {
        let mut ch = codec.empty_chromosome();
        for node in codec.graph().nodes() {
            if !node.work_unit().worker_reqs.is_empty() {
                ch.resources[0][node.index().index()] = count;
            }
        }
        ch
    }

    #[test]
    fn test_kinds_and_borders() {
        let g = chain_graph();
        let cs = vec![
            Contractor::new("C1").with_workers("worker", 5),
            Contractor::new("C2").with_workers("driver", 2),
        ];
        let codec = ChromosomeCodec::new(&g, &cs);
        assert_eq!(codec.kinds(), &["driver".to_string(), "worker".to_string()]);
        assert_eq!(codec.borders(), vec![vec![0, 5], vec![2, 0]]);
    }

    #[test]
    fn test_decode_sequential_chain() {
        let g = chain_graph();
        let cs = contractors();
        let codec = ChromosomeCodec::new(&g, &cs);
        let schedule = codec.decode(&uniform(&codec, 2)).unwrap();

        let a = schedule.get("A").unwrap();
        let b = schedule.get("B").unwrap();
        let c = schedule.get("C").unwrap();
        assert!(a.finish <= b.start);
        assert!(b.finish <= c.start);
        assert_eq!((a.start, a.finish), (Time::new(0), Time::new(2)));
        assert_eq!((b.start, b.finish), (Time::new(2), Time::new(5)));
        assert_eq!((c.start, c.finish), (Time::new(5), Time::new(6)));
        assert_eq!(a.count_of("worker"), 2);
        assert_eq!(schedule.execution_time(), 6);
    }

    #[test]
    fn test_decode_respects_capacity_between_parallel_works() {
        let g = parallel_graph();
        let cs = contractors();
        let codec = ChromosomeCodec::new(&g, &cs);
        // 3 + 3 workers exceed the border of 5, so A and the B ⇒ C chain
        // cannot overlap.
        let schedule = codec.decode(&uniform(&codec, 3)).unwrap();

        let a = schedule.get("A").unwrap();
        let b = schedule.get("B").unwrap();
        let c = schedule.get("C").unwrap();
        assert_eq!(b.finish, c.start);
        assert!(a.finish <= b.start || c.finish <= a.start);
    }

    #[test]
    fn test_decode_inseparable_chain_is_contiguous() {
        let g = parallel_graph();
        let cs = contractors();
        let codec = ChromosomeCodec::new(&g, &cs);
        let schedule = codec.decode(&uniform(&codec, 2)).unwrap();

        let b = schedule.get("B").unwrap();
        let c = schedule.get("C").unwrap();
        assert_eq!(b.finish, c.start);
        // 2 + 2 workers fit side by side with A
        assert_eq!(schedule.get("A").unwrap().start, 0);
        assert_eq!(b.start, 0);
    }

    #[test]
    fn test_order_sets_priority() {
        let g = parallel_graph();
        let cs = contractors();
        let codec = ChromosomeCodec::new(&g, &cs);
        let a = g.index_of("A").unwrap().index();
        let b = g.index_of("B").unwrap().index();

        let mut ch = uniform(&codec, 3);
        let start = ch.order.remove(ch.order.iter().position(|&i| i == 0).unwrap());
        ch.order.retain(|&i| i != a && i != b);
        ch.order.splice(0..0, [start, b, a]);
        let schedule = codec.decode(&ch).unwrap();

        assert_eq!(schedule.get("B").unwrap().start, 0);
        assert_eq!(schedule.get("A").unwrap().start, schedule.get("C").unwrap().finish);
    }

    #[test]
    fn test_decode_with_start_time() {
        let g = chain_graph();
        let cs = contractors();
        let codec = ChromosomeCodec::new(&g, &cs).with_start_time(Time::new(100));
        let schedule = codec.decode(&uniform(&codec, 2)).unwrap();
        assert_eq!(schedule.get("start").unwrap().start, 100);
        assert_eq!(schedule.get("A").unwrap().start, 100);
    }

    #[test]
    fn test_decode_lag() {
        let mut b = GraphBuilder::new();
        let s = b.add_node_after(WorkUnit::service("start"), &[]).unwrap();
        let a = b.add_node_after(WorkUnit::new("A").with_req(req(2.0)), &[s]).unwrap();
        let l = b
            .add_node(
                WorkUnit::new("L").with_req(req(2.0)),
                [(a, 3.0, EdgeType::LagFinishStart)],
            )
            .unwrap();
        let f = b.add_node_after(WorkUnit::service("finish"), &[l]).unwrap();
        let g = b.build(s, f).unwrap();
        let cs = contractors();
        let codec = ChromosomeCodec::new(&g, &cs);
        let schedule = codec.decode(&uniform(&codec, 1)).unwrap();

        assert_eq!(schedule.get("A").unwrap().finish, 2);
        assert_eq!(schedule.get("L").unwrap().start, 5);
    }

    #[test]
    fn test_unrequired_allocation_ignored_and_minimum_raised() {
        let g = chain_graph();
        let cs = vec![Contractor::new("C1")
            .with_workers("worker", 5)
            .with_workers("driver", 9)];
        let codec = ChromosomeCodec::new(&g, &cs);
        let driver = codec.kind_index("driver").unwrap();
        let worker = codec.kind_index("worker").unwrap();
        let a = g.index_of("A").unwrap().index();

        let mut ch = codec.empty_chromosome();
        ch.resources[driver][a] = 7;
        ch.resources[worker][a] = 0;
        let schedule = codec.decode(&ch).unwrap();

        let a = schedule.get("A").unwrap();
        assert_eq!(a.count_of("driver"), 0);
        assert_eq!(a.count_of("worker"), 1);
    }

    #[test]
    fn test_invalid_chromosomes() {
        let g = chain_graph();
        let cs = contractors();
        let codec = ChromosomeCodec::new(&g, &cs);
        let base = uniform(&codec, 2);

        let mut not_perm = base.clone();
        not_perm.order[1] = not_perm.order[0];
        assert!(matches!(codec.decode(&not_perm), Err(Error::InvalidChromosome(_))));

        let mut short = base.clone();
        short.order.pop();
        assert!(matches!(codec.decode(&short), Err(Error::InvalidChromosome(_))));

        let mut over = base.clone();
        over.resources[0][1] = 6;
        assert!(matches!(codec.decode(&over), Err(Error::InvalidChromosome(_))));

        let mut tight = base.clone();
        tight.borders[0][0] = 1;
        assert!(matches!(codec.decode(&tight), Err(Error::InvalidChromosome(_))));

        let mut bad_contractor = base;
        bad_contractor.contractors[2] = 4;
        assert!(matches!(codec.decode(&bad_contractor), Err(Error::InvalidChromosome(_))));
    }

    #[test]
    fn test_encode_orders_by_start() {
        let g = parallel_graph();
        let cs = contractors();
        let codec = ChromosomeCodec::new(&g, &cs);
        let schedule = codec.decode(&uniform(&codec, 3)).unwrap();
        let ch = codec.encode(&schedule).unwrap();

        let starts: Vec<Time> = ch
            .order
            .iter()
            .map(|&i| schedule.get(g.nodes()[i].id()).unwrap().start)
            .collect();
        assert!(starts.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(ch.borders, codec.borders());
        let a = g.index_of("A").unwrap().index();
        assert_eq!(ch.resources[0][a], 3);
    }

    #[test]
    fn test_encode_missing_work() {
        let g = chain_graph();
        let cs = contractors();
        let codec = ChromosomeCodec::new(&g, &cs);
        let mut schedule = codec.decode(&uniform(&codec, 2)).unwrap();
        let works: Vec<ScheduledWork> = schedule
            .works()
            .iter()
            .filter(|w| w.work_id != "B")
            .cloned()
            .collect();
        schedule = Schedule::from_scheduled_works(works);
        assert!(matches!(codec.encode(&schedule), Err(Error::NotFound(_))));
    }

    #[test]
    fn test_suitable_contractors() {
        let g = chain_graph();
        let cs = vec![
            Contractor::new("empty"),
            Contractor::new("C1").with_workers("worker", 1),
        ];
        let codec = ChromosomeCodec::new(&g, &cs);
        let a = g.index_of("A").unwrap();
        assert_eq!(codec.suitable_contractors(a).unwrap(), vec![1]);
        assert_eq!(codec.suitable_contractors(g.start().index()).unwrap(), vec![0, 1]);

        let none: Vec<Contractor> = vec![Contractor::new("empty")];
        let codec = ChromosomeCodec::new(&g, &none);
        assert!(matches!(
            codec.suitable_contractors(a),
            Err(Error::NoSuitableContractor(_))
        ));
    }

    /// start → {A, X}, A ⇒ B inseparable, X → B with lag 3
    #[test]
    fn test_chain_member_waits_for_outside_parent() {
        let mut b = GraphBuilder::new();
        let s = b.add_node_after(WorkUnit::service("start"), &[]).unwrap();
        let a = b.add_node_after(WorkUnit::new("A").with_req(req(2.0)), &[s]).unwrap();
        let x = b.add_node_after(WorkUnit::new("X").with_req(req(10.0)), &[s]).unwrap();
        let bb = b
            .add_node(
                WorkUnit::new("B").with_req(req(2.0)),
                [
                    (a, 0.0, EdgeType::InseparableFinishStart),
                    (x, 3.0, EdgeType::LagFinishStart),
                ],
            )
            .unwrap();
        let f = b.add_node_after(WorkUnit::service("finish"), &[bb]).unwrap();
        let g = b.build(s, f).unwrap();
        let cs = contractors();
        let codec = ChromosomeCodec::new(&g, &cs);
        let schedule = codec.decode(&uniform(&codec, 1)).unwrap();

        let (a, x, bb) = (
            schedule.get("A").unwrap(),
            schedule.get("X").unwrap(),
            schedule.get("B").unwrap(),
        );
        assert_eq!(x.finish, 10);
        assert!(bb.start >= x.finish + 3);
        assert_eq!(a.finish, bb.start);
        assert!(crate::validation::validate_schedule(&schedule, &g, &cs).is_ok());
    }

    /// A ⇒ B ⇒ C inseparable, plus A → C with lag 100
    fn lagged_chain_graph() -> WorkGraph {
        let mut b = GraphBuilder::new();
        let s = b.add_node_after(WorkUnit::service("start"), &[]).unwrap();
        let a = b.add_node_after(WorkUnit::new("A").with_req(req(2.0)), &[s]).unwrap();
        let bb = b
            .add_node(
                WorkUnit::new("B").with_req(req(2.0)),
                [(a, 0.0, EdgeType::InseparableFinishStart)],
            )
            .unwrap();
        let c = b
            .add_node(
                WorkUnit::new("C").with_req(req(2.0)),
                [
                    (bb, 0.0, EdgeType::InseparableFinishStart),
                    (a, 100.0, EdgeType::LagFinishStart),
                ],
            )
            .unwrap();
        let f = b.add_node_after(WorkUnit::service("finish"), &[c]).unwrap();
        b.build(s, f).unwrap()
    }

    #[test]
    fn test_lag_inside_chain_rejected() {
        let g = lagged_chain_graph();
        let cs = contractors();
        let codec = ChromosomeCodec::new(&g, &cs);
        assert!(matches!(
            codec.decode(&uniform(&codec, 1)),
            Err(Error::InvalidChromosome(_))
        ));
    }

    #[test]
    fn test_lag_inside_chain_covered_by_middle_work() {
        let mut b = GraphBuilder::new();
        let s = b.add_node_after(WorkUnit::service("start"), &[]).unwrap();
        let a = b.add_node_after(WorkUnit::new("A").with_req(req(2.0)), &[s]).unwrap();
        let bb = b
            .add_node(
                WorkUnit::new("B").with_req(req(4.0)),
                [(a, 0.0, EdgeType::InseparableFinishStart)],
            )
            .unwrap();
        let c = b
            .add_node(
                WorkUnit::new("C").with_req(req(2.0)),
                [
                    (bb, 0.0, EdgeType::InseparableFinishStart),
                    (a, 3.0, EdgeType::LagFinishStart),
                ],
            )
            .unwrap();
        let f = b.add_node_after(WorkUnit::service("finish"), &[c]).unwrap();
        let g = b.build(s, f).unwrap();
        let cs = contractors();
        let codec = ChromosomeCodec::new(&g, &cs);

        // B takes 4 with one worker, 1 with four
        let schedule = codec.decode(&uniform(&codec, 1)).unwrap();
        assert_eq!(schedule.get("C").unwrap().start, 6);
        assert!(crate::validation::validate_schedule(&schedule, &g, &cs).is_ok());
        assert!(matches!(
            codec.decode(&uniform(&codec, 4)),
            Err(Error::InvalidChromosome(_))
        ));
    }

    #[test]
    fn test_evaluate_batch() {
        let g = chain_graph();
        let cs = contractors();
        let codec = ChromosomeCodec::new(&g, &cs);
        let mut broken = uniform(&codec, 2);
        broken.order.pop();

        let fitness = codec.evaluate(&[uniform(&codec, 1), broken, uniform(&codec, 2)]);
        assert_eq!(fitness.len(), 3);
        assert_eq!(*fitness[0].as_ref().unwrap(), 12);
        assert!(matches!(fitness[1], Err(Error::InvalidChromosome(_))));
        assert_eq!(*fitness[2].as_ref().unwrap(), 6);
        assert!(codec.evaluate(&[]).is_empty());
    }

    #[test]
    fn test_decode_needs_a_contractor() {
        let mut b = GraphBuilder::new();
        let s = b.add_node_after(WorkUnit::service("start"), &[]).unwrap();
        let f = b.add_node_after(WorkUnit::service("finish"), &[s]).unwrap();
        let g = b.build(s, f).unwrap();
        let none: Vec<Contractor> = Vec::new();
        let codec = ChromosomeCodec::new(&g, &none);
        assert!(matches!(
            codec.decode(&codec.empty_chromosome()),
            Err(Error::InvalidChromosome(_))
        ));
    }
}
