//! Property-based tests for the graph, time and codec invariants.
//!
//! Random project graphs are generated as layered DAGs: every work hangs
//! off `start`, may depend on earlier works, and feeds `finish`.

use proptest::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;

use u_rcpsp::ga::{Chromosome, ChromosomeCodec};
use u_rcpsp::graph::{EdgeType, GraphBuilder, NodeIndex, WorkGraph, DEFAULT_LAG};
use u_rcpsp::models::{Contractor, Time, WorkUnit, WorkerReq, TIME_INF};
use u_rcpsp::validation::validate_schedule;

const KINDS: [&str; 2] = ["driver", "worker"];

/// One generated work: volumes per kind and `(parent, relation)` links to
/// earlier works. Relation 0 = FS, 1 = lagged FS, 2 = SS, 3 = inseparable.
#[derive(Debug, Clone)]
struct WorkPlan {
    volumes: [f64; 2],
    links: Vec<(usize, u8)>,
}

fn work_plan() -> impl Strategy<Value = WorkPlan> {
    (
        prop::array::uniform2(0.0f64..20.0),
        // parents are taken modulo the work position in `build_graph`
        prop::collection::vec((0usize..64, 0u8..4), 0..3),
    )
        .prop_map(|(volumes, links)| WorkPlan { volumes, links })
}

fn project_strategy() -> impl Strategy<Value = Vec<WorkPlan>> {
    prop::collection::vec(work_plan(), 1..12)
}

fn contractors_strategy() -> impl Strategy<Value = Vec<Contractor>> {
    prop::collection::vec(prop::array::uniform2(1u32..8), 1..4).prop_map(|caps| {
        caps.into_iter()
            .enumerate()
            .map(|(i, [d, w])| {
                Contractor::new(format!("C{i}"))
                    .with_workers(KINDS[0], d)
                    .with_workers(KINDS[1], w)
            })
            .collect()
    })
}

/// Builds a graph that always passes `GraphBuilder::build`: inseparable
/// links only join a free parent to a child, and a chained child only
/// takes finish-start parents listed before its chain head, so chains
/// never wait on each other in a cycle.
fn build_graph(plans: &[WorkPlan]) -> WorkGraph {
    let mut b = GraphBuilder::new();
    let start = b.add_node_after(WorkUnit::service("start"), &[]).unwrap();
    let mut works: Vec<NodeIndex> = Vec::new();
    let mut has_inseparable_child: Vec<bool> = Vec::new();
    let mut chain_head: Vec<usize> = Vec::new();

    for (i, plan) in plans.iter().enumerate() {
        let mut unit = WorkUnit::new(format!("w{i}"));
        for (kind, &volume) in KINDS.iter().zip(&plan.volumes) {
            if volume > 1.0 {
                unit = unit.with_req(WorkerReq::new(*kind, volume.floor()).with_counts(1, 6));
            }
        }

        let mut chained_to = None;
        if i > 0 {
            if let Some(&(p, 3)) = plan.links.first() {
                let p = p % i;
                if !has_inseparable_child[p] {
                    has_inseparable_child[p] = true;
                    chained_to = Some(p);
                }
            }
        }

        let mut parents = vec![(start, DEFAULT_LAG, EdgeType::FinishStart)];
        let head = match chained_to {
            Some(p) => {
                parents.push((works[p], 0.0, EdgeType::InseparableFinishStart));
                let head = chain_head[p];
                let mut outside: Vec<usize> = Vec::new();
                for &(q, rel) in plan.links.iter().skip(1) {
                    let q = q % i;
                    if rel > 1 || q >= head || outside.contains(&q) {
                        continue;
                    }
                    outside.push(q);
                    parents.push(match rel {
                        0 => (works[q], DEFAULT_LAG, EdgeType::FinishStart),
                        _ => (works[q], 2.0, EdgeType::LagFinishStart),
                    });
                }
                head
            }
            None => {
                for &(q, rel) in plan.links.iter().filter(|_| i > 0) {
                    let q = works[q % i];
                    parents.push(match rel {
                        0 => (q, DEFAULT_LAG, EdgeType::FinishStart),
                        1 => (q, 2.0, EdgeType::LagFinishStart),
                        _ => (q, DEFAULT_LAG, EdgeType::StartStart),
                    });
                }
                i
            }
        };

        works.push(b.add_node(unit, parents).unwrap());
        has_inseparable_child.push(false);
        chain_head.push(head);
    }

    let finish = b.add_node_after(WorkUnit::service("finish"), &works).unwrap();
    b.build(start, finish).unwrap()
}

proptest! {
    #[test]
    fn time_construction_clamps(v in any::<i64>()) {
        let t = Time::new(v);
        prop_assert_eq!(t.value(), v.clamp(-TIME_INF, TIME_INF));
    }

    #[test]
    fn time_arithmetic_stays_in_range(a in any::<i64>(), b in any::<i64>()) {
        let (x, y) = (Time::new(a), Time::new(b));
        for r in [x + y, x - y, x * y, x / y, x + b, b - x] {
            prop_assert!(r.value() >= -TIME_INF && r.value() <= TIME_INF);
        }
        prop_assert_eq!(Time::inf() + a.max(0), Time::inf());
        prop_assert_eq!(-Time::inf() - a.max(0), -Time::inf());
    }

    #[test]
    fn time_overflow_saturates_with_sign(a in any::<i64>(), b in any::<i64>()) {
        let exact = a.clamp(-TIME_INF, TIME_INF) + b.clamp(-TIME_INF, TIME_INF);
        let sum = Time::new(a) + Time::new(b);
        if exact >= TIME_INF {
            prop_assert_eq!(sum, Time::inf());
        } else if exact <= -TIME_INF {
            prop_assert_eq!(sum, -Time::inf());
        } else {
            prop_assert_eq!(sum.value(), exact);
        }
        prop_assert_eq!(Time::new(a).is_infinite(), a.clamp(-TIME_INF, TIME_INF).abs() == TIME_INF);
    }

    #[test]
    fn time_addition_is_exact_below_bound(
        a in -1_000_000_000i64..1_000_000_000,
        b in -1_000_000_000i64..1_000_000_000,
    ) {
        prop_assert_eq!((Time::new(a) + Time::new(b)).value(), a + b);
    }

    #[test]
    fn graph_is_topologically_sorted(plans in project_strategy()) {
        let graph = build_graph(&plans);
        prop_assert_eq!(graph.len(), plans.len() + 2);
        prop_assert_eq!(graph.start().index().index(), 0);
        for node in graph.nodes() {
            for parent in node.parents() {
                prop_assert!(parent.index() < node.index().index());
            }
        }
    }

    #[test]
    fn inseparable_chains_are_linked(plans in project_strategy()) {
        let graph = build_graph(&plans);
        for node in graph.nodes() {
            if let Some(chain) = node.inseparable_chain() {
                prop_assert!(chain.len() >= 2);
                prop_assert_eq!(chain[0], node.index());
                for pair in chain.windows(2) {
                    prop_assert_eq!(graph[pair[0]].inseparable_son(), Some(pair[1]));
                    prop_assert_eq!(graph[pair[1]].inseparable_parent(), Some(pair[0]));
                }
            } else {
                prop_assert_eq!(node.inseparable_chain_with_self(), &[node.index()][..]);
            }
        }
    }

    #[test]
    fn serialized_graph_roundtrips(plans in project_strategy()) {
        let graph = build_graph(&plans);
        let json = serde_json::to_string(&graph).unwrap();
        let back: WorkGraph = serde_json::from_str(&json).unwrap();
        prop_assert_eq!(back.len(), graph.len());
        for a in graph.nodes() {
            let b = back.node(a.id()).unwrap();
            prop_assert_eq!(a.edges_to().len(), b.edges_to().len());
            prop_assert_eq!(
                a.inseparable_chain().map(<[_]>::len),
                b.inseparable_chain().map(<[_]>::len)
            );
        }
    }

    #[test]
    fn random_chromosome_decodes_to_valid_schedule(
        plans in project_strategy(),
        contractors in contractors_strategy(),
        seed in any::<u64>(),
    ) {
        let graph = build_graph(&plans);
        let codec = ChromosomeCodec::new(&graph, &contractors);
        let mut rng = SmallRng::seed_from_u64(seed);
        let chromosome = Chromosome::random(&codec, &mut rng).unwrap();

        for (c, row) in chromosome.borders.iter().enumerate() {
            for (kind, &border) in row.iter().enumerate() {
                for node in 0..chromosome.node_count() {
                    if chromosome.contractors[node] == c {
                        prop_assert!(chromosome.allocation(kind, node) <= border);
                    }
                }
            }
        }

        let schedule = codec.decode(&chromosome).unwrap();
        prop_assert_eq!(schedule.len(), graph.len());
        prop_assert!(validate_schedule(&schedule, &graph, &contractors).is_ok());
    }

    #[test]
    fn encode_then_decode_stays_valid(
        plans in project_strategy(),
        contractors in contractors_strategy(),
        seed in any::<u64>(),
    ) {
        let graph = build_graph(&plans);
        let codec = ChromosomeCodec::new(&graph, &contractors).with_start_time(Time::new(10));
        let mut rng = SmallRng::seed_from_u64(seed);
        let original = codec.decode(&Chromosome::random(&codec, &mut rng).unwrap()).unwrap();

        let encoded = codec.encode(&original).unwrap();
        prop_assert!(encoded.is_permutation());
        let decoded = codec.decode(&encoded).unwrap();

        prop_assert!(validate_schedule(&decoded, &graph, &contractors).is_ok());
        for work in original.works() {
            let again = decoded.get(&work.work_id).unwrap();
            // re-decoding a left-justified schedule never starts a work earlier
            prop_assert!(again.start >= work.start);
            prop_assert_eq!(&again.contractor_id, &work.contractor_id);
            prop_assert_eq!(again.duration(), work.duration());
        }
    }

    #[test]
    fn halved_allocations_decode_under_shrunk_borders(
        plans in project_strategy(),
        contractors in contractors_strategy(),
        seed in any::<u64>(),
    ) {
        let graph = build_graph(&plans);
        let codec = ChromosomeCodec::new(&graph, &contractors);
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut chromosome = Chromosome::random(&codec, &mut rng).unwrap();

        for row in chromosome.resources.iter_mut() {
            for count in row.iter_mut() {
                *count = count.div_ceil(2);
            }
        }
        let column_max: Vec<u32> = chromosome
            .resources
            .iter()
            .map(|row| row.iter().copied().max().unwrap_or(0))
            .collect();
        for border in chromosome.borders.iter_mut() {
            border.clone_from(&column_max);
        }

        let schedule = codec.decode(&chromosome).unwrap();
        let shrunk: Vec<Contractor> = contractors
            .iter()
            .map(|c| {
                codec.kinds().iter().zip(&column_max).fold(
                    Contractor::new(c.id.clone()),
                    |acc, (kind, &count)| acc.with_workers(kind.clone(), count),
                )
            })
            .collect();
        prop_assert!(validate_schedule(&schedule, &graph, &shrunk).is_ok());
    }
}
