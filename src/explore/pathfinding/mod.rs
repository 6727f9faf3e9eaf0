use std::cmp::Ordering;
use std::collections::{BTreeMap, BinaryHeap};

use fixedbitset::FixedBitSet;

use super::fixed_math::FixedNum;
use super::graph::{Vertex, WorldGraph};


/// Heap entry for the Dijkstra frontier. The reversed comparison turns the
/// std max-heap into a min-heap on cost; ties pop the lexicographically
/// smallest vertex first, which fixes the relaxation order and therefore the
/// exact path returned for equal-cost alternatives.
#[derive(Clone, Copy, PartialEq, Eq)]
struct State {
    cost: FixedNum,
    vertex: Vertex,
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .cmp(&self.cost)
            .then_with(|| other.vertex.cmp(&self.vertex))
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

struct Solved {
    dist: BTreeMap<Vertex, FixedNum>,
    prev: BTreeMap<Vertex, Vertex>,
}

/// Single-source run over the whole graph. Both public entry points share
/// this; for the map sizes in play (tens to low hundreds of walkable tiles)
/// one full solve per click is well inside interactive budgets.
fn solve(graph: &impl WorldGraph, source: Vertex) -> Solved {
    let mut order = graph.vertices();
    order.push(source);
    order.sort_unstable();
    order.dedup();

    let mut settled = FixedBitSet::with_capacity(order.len());
    let mut dist: BTreeMap<Vertex, FixedNum> = BTreeMap::new();
    let mut prev: BTreeMap<Vertex, Vertex> = BTreeMap::new();
    let mut frontier = BinaryHeap::new();

    dist.insert(source, FixedNum::ZERO);
    frontier.push(State { cost: FixedNum::ZERO, vertex: source });

    while let Some(State { cost, vertex }) = frontier.pop() {
        let idx = order
            .binary_search(&vertex)
            .expect("frontier vertices come from the vertex order");
        if settled.contains(idx) {
            continue;
        }
        settled.insert(idx);

        for next in graph.neighbors(vertex) {
            let candidate = cost + graph.distance(vertex, next);
            let better = match dist.get(&next) {
                Some(&known) => candidate < known,
                None => true,
            };
            if better {
                dist.insert(next, candidate);
                prev.insert(next, vertex);
                frontier.push(State { cost: candidate, vertex: next });
            }
        }
    }

    Solved { dist, prev }
}

/// Walk predecessor links back from `destination`. The returned path starts
/// at the hop after `source` and ends at `destination`; it is empty when the
/// two coincide or when `destination` was never reached.
fn reconstruct(solved: &Solved, source: Vertex, destination: Vertex) -> Vec<Vertex> {
    if destination == source || !solved.dist.contains_key(&destination) {
        return Vec::new();
    }

    let mut path = vec![destination];
    let mut current = destination;
    while let Some(&predecessor) = solved.prev.get(&current) {
        if predecessor == source {
            path.reverse();
            return path;
        }
        path.push(predecessor);
        current = predecessor;
    }

    // Predecessor chain never reached the source: unreachable destination.
    Vec::new()
}

/// Shortest path from `source` to `destination`, or empty when the
/// destination is the source itself or cannot be reached.
pub fn shortest_path(graph: &impl WorldGraph, source: Vertex, destination: Vertex) -> Vec<Vertex> {
    let solved = solve(graph, source);
    reconstruct(&solved, source, destination)
}

/// Shortest path to whichever of `destinations` is cheapest to reach. Ties
/// resolve to the lexicographically smallest vertex. An empty or fully
/// unreachable candidate set yields an empty path, never a panic.
pub fn shortest_path_to_closest(
    graph: &impl WorldGraph,
    source: Vertex,
    destinations: &[Vertex],
) -> Vec<Vertex> {
    let solved = solve(graph, source);

    let mut best: Option<(FixedNum, Vertex)> = None;
    for &candidate in destinations {
        let Some(&cost) = solved.dist.get(&candidate) else {
            continue;
        };
        let better = match best {
            Some((best_cost, best_vertex)) => {
                cost < best_cost || (cost == best_cost && candidate < best_vertex)
            }
            None => true,
        };
        if better {
            best = Some((cost, candidate));
        }
    }

    match best {
        Some((_, winner)) => reconstruct(&solved, source, winner),
        None => Vec::new(),
    }
}
