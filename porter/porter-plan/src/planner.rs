//! Graph construction and least-cost route search over storage-formats.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use porter_core::{Conversion, DataFormat, StorageEngine, StorageFormat};
use tracing::debug;

use crate::copier::{Capability, CopierRegistry, RegisteredCopier};
use crate::path::{CopyEdge, CopyPath};

/// Record count used to price cost functions when the caller has no
/// better estimate. Prices only; never bounds result size.
pub const DEFAULT_EXPECTED_RECORDS: u64 = 10_000;

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// No chain of registered copiers bridges the endpoints given the
    /// available storages. Recovery means adding storages or formats and
    /// planning again; the planner itself never retries.
    #[error("no copy route from {from} to {to} with the available storages")]
    NoRoute {
        from: StorageFormat,
        to: StorageFormat,
    },
}

/// Plans least-cost copy paths against a frozen copier registry.
pub struct Planner<'a, C: ?Sized> {
    registry: &'a CopierRegistry<C>,
}

/// Frontier entry ordered for a min-heap: the cheapest tentative node
/// pops first.
struct FrontierEntry {
    cost: f64,
    node: usize,
}

impl PartialEq for FrontierEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for FrontierEntry {}

impl PartialOrd for FrontierEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl<'a, C: ?Sized + Capability> Planner<'a, C> {
    pub fn new(registry: &'a CopierRegistry<C>) -> Self {
        Self { registry }
    }

    /// Find the minimum-total-cost chain of conversions from
    /// `conversion.from` to `conversion.to`.
    ///
    /// Nodes are every storage-format reachable from `engines` crossed
    /// with `formats` (restricted to natively supported combinations),
    /// plus both endpoints. Edge weights are copier costs priced at
    /// `expected_records`; equal-cost copiers on the same edge tie-break
    /// by registration sequence.
    pub fn plan(
        &self,
        conversion: Conversion,
        engines: &[StorageEngine],
        formats: &[DataFormat],
        expected_records: u64,
    ) -> Result<CopyPath<C>, PlanError> {
        if conversion.is_identity() {
            return Ok(CopyPath::empty(expected_records));
        }

        let nodes = enumerate_nodes(conversion, engines, formats);
        let index: HashMap<StorageFormat, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (*node, i))
            .collect();
        let source = index[&conversion.from];
        let target = index[&conversion.to];

        // Weighted adjacency; many copiers can serve one node pair, only
        // the cheapest weight matters for the search.
        let mut adjacency: Vec<Vec<(usize, f64)>> = vec![Vec::new(); nodes.len()];
        let mut edge_count = 0usize;
        for (from_idx, from) in nodes.iter().enumerate() {
            for (to_idx, to) in nodes.iter().enumerate() {
                if from_idx == to_idx {
                    continue;
                }
                let hop = Conversion::new(*from, *to);
                let cheapest = self
                    .registry
                    .matching(&hop)
                    .into_iter()
                    .map(|entry| entry.copier.cost().total_cost(expected_records))
                    .min_by(f64::total_cmp);
                if let Some(weight) = cheapest {
                    adjacency[from_idx].push((to_idx, weight));
                    edge_count += 1;
                }
            }
        }
        debug!(
            nodes = nodes.len(),
            edges = edge_count,
            from = %conversion.from,
            to = %conversion.to,
            "built planning graph"
        );

        let route = shortest_path(&adjacency, source, target).ok_or(PlanError::NoRoute {
            from: conversion.from,
            to: conversion.to,
        })?;

        let mut edges = Vec::with_capacity(route.len().saturating_sub(1));
        for pair in route.windows(2) {
            let hop = Conversion::new(nodes[pair[0]], nodes[pair[1]]);
            let chosen = self
                .cheapest_copier(&hop, expected_records)
                .ok_or(PlanError::NoRoute {
                    from: conversion.from,
                    to: conversion.to,
                })?;
            edges.push(CopyEdge {
                cost: chosen.copier.cost().total_cost(expected_records),
                copier: chosen.copier,
                conversion: hop,
            });
        }
        let path = CopyPath {
            edges,
            expected_records,
        };
        debug!(hops = path.len(), cost = path.total_cost(), "planned copy path");
        Ok(path)
    }

    /// Cheapest copier serving this exact conversion; cost ties break by
    /// registration sequence so planning is reproducible.
    fn cheapest_copier(
        &self,
        conversion: &Conversion,
        expected_records: u64,
    ) -> Option<RegisteredCopier<C>> {
        self.registry
            .matching(conversion)
            .into_iter()
            .min_by(|a, b| {
                a.copier
                    .cost()
                    .total_cost(expected_records)
                    .total_cmp(&b.copier.cost().total_cost(expected_records))
                    .then_with(|| a.seq.cmp(&b.seq))
            })
    }
}

/// Every storage-format reachable from the available engines, plus the
/// conversion endpoints. An engine reaches a format natively when the
/// format's natural class is the engine's class (and its natural engine,
/// if any, is the engine itself).
fn enumerate_nodes(
    conversion: Conversion,
    engines: &[StorageEngine],
    formats: &[DataFormat],
) -> Vec<StorageFormat> {
    fn add(nodes: &mut Vec<StorageFormat>, node: StorageFormat) {
        if !nodes.contains(&node) {
            nodes.push(node);
        }
    }

    let mut nodes = vec![conversion.from];
    add(&mut nodes, conversion.to);
    for engine in engines {
        for format in formats {
            if supports(*engine, *format) {
                add(&mut nodes, StorageFormat::new(*engine, *format));
            }
        }
    }
    nodes
}

fn supports(engine: StorageEngine, format: DataFormat) -> bool {
    format.natural_class() == engine.class()
        && format.natural_engine().is_none_or(|native| native == engine)
}

/// Dijkstra over non-negative edge weights. Returns the node sequence of
/// a minimum-weight route, or `None` when the target is unreachable.
fn shortest_path(
    adjacency: &[Vec<(usize, f64)>],
    source: usize,
    target: usize,
) -> Option<Vec<usize>> {
    let mut dist = vec![f64::INFINITY; adjacency.len()];
    let mut prev: Vec<Option<usize>> = vec![None; adjacency.len()];
    let mut frontier = BinaryHeap::new();
    dist[source] = 0.0;
    frontier.push(FrontierEntry {
        cost: 0.0,
        node: source,
    });

    while let Some(FrontierEntry { cost, node }) = frontier.pop() {
        if node == target {
            break;
        }
        if cost > dist[node] {
            continue;
        }
        for &(next, weight) in &adjacency[node] {
            let tentative = cost + weight;
            if tentative < dist[next] {
                dist[next] = tentative;
                prev[next] = Some(node);
                frontier.push(FrontierEntry {
                    cost: tentative,
                    node: next,
                });
            }
        }
    }

    if dist[target].is_infinite() {
        return None;
    }
    let mut route = vec![target];
    while let Some(&Some(parent)) = prev.get(*route.last().expect("route is non-empty")) {
        route.push(parent);
    }
    route.reverse();
    Some(route)
}
