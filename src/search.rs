use crate::graph::WikiGraph;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

const UNREACHED: u32 = u32::MAX;

/// Result of a shortest-path query. Unknown titles and unreachable
/// destinations are ordinary outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathOutcome {
    /// Titles from start to end inclusive; a self-query yields one element.
    Path(Vec<String>),
    NoRoute,
    UnknownTitle(String),
}

/// Knobs for a single search.
#[derive(Debug, Default, Clone, Copy)]
pub struct SearchOptions {
    /// Stop after settling this many nodes. The bounded-deadline hook for
    /// very large graphs; `None` searches exhaustively.
    pub max_visits: Option<usize>,
}

pub fn shortest_path(graph: &WikiGraph, start: &str, end: &str) -> PathOutcome {
    shortest_path_with(graph, start, end, SearchOptions::default())
}

/// Dijkstra over unit-weight directed edges. The frontier is a min-heap keyed
/// by `(distance, node index)`, so nodes settle in ascending distance with
/// ties broken by ascending index -- the same path comes back on every run.
pub fn shortest_path_with(
    graph: &WikiGraph,
    start: &str,
    end: &str,
    options: SearchOptions,
) -> PathOutcome {
    let Some(start_index) = graph.index_of(start) else {
        return PathOutcome::UnknownTitle(start.to_string());
    };
    let Some(end_index) = graph.index_of(end) else {
        return PathOutcome::UnknownTitle(end.to_string());
    };

    if start_index == end_index {
        return PathOutcome::Path(vec![graph.title_of(start_index).to_string()]);
    }

    let n = graph.node_count();
    let mut dist = vec![UNREACHED; n];
    let mut prev = vec![UNREACHED; n];
    let mut frontier = BinaryHeap::new();
    let mut visits = 0usize;

    dist[start_index as usize] = 0;
    frontier.push(Reverse((0u32, start_index)));

    while let Some(Reverse((d, u))) = frontier.pop() {
        if d > dist[u as usize] {
            continue; // stale frontier entry
        }
        if u == end_index {
            break;
        }
        visits += 1;
        if options.max_visits.is_some_and(|budget| visits > budget) {
            break;
        }
        for &v in graph.neighbors(u) {
            let candidate = d + 1;
            if candidate < dist[v as usize] {
                dist[v as usize] = candidate;
                prev[v as usize] = u;
                frontier.push(Reverse((candidate, v)));
            }
        }
    }

    if dist[end_index as usize] == UNREACHED {
        return PathOutcome::NoRoute;
    }

    let mut indices = vec![end_index];
    let mut current = end_index;
    while current != start_index {
        current = prev[current as usize];
        indices.push(current);
    }
    indices.reverse();

    PathOutcome::Path(
        indices
            .into_iter()
            .map(|index| graph.title_of(index).to_string())
            .collect(),
    )
}
