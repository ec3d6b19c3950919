//! Proximity clustering of placed items.
//!
//! Two items are linked when their Euclidean distance is within the
//! [`ProximityThreshold`] (inclusive). Clusters are the connected components
//! of that implicit graph, found by breadth-first search.
//!
//! # Scaling
//!
//! Every BFS step scans all unvisited items, so a pass is O(n²) in the
//! number of items. That is fine for an interactive canvas holding tens of
//! items; a workspace with thousands of items would need a spatial index.

use crate::position::{Position, ProximityThreshold};
use std::collections::VecDeque;

/// A connected component of items. Members are indices into the slice that
/// was clustered, sorted ascending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub members: Vec<usize>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// A single item can never react; callers skip such clusters.
    pub fn is_reactive(&self) -> bool {
        self.members.len() >= 2
    }

    /// Mean position of the members.
    pub fn centroid(&self, positions: &[Position]) -> Option<Position> {
        Position::centroid(self.members.iter().filter_map(|&i| positions.get(i).copied()))
    }
}

/// Partition `positions` into clusters.
///
/// Seeds are taken in input order and neighbours are scanned in input order,
/// so the result depends only on the sequence given. Every index appears in
/// exactly one cluster; clusters are returned in order of their lowest
/// member.
pub fn build_clusters(positions: &[Position], threshold: ProximityThreshold) -> Vec<Cluster> {
    let mut visited = vec![false; positions.len()];
    let mut clusters = Vec::new();
    let mut queue = VecDeque::new();

    for seed in 0..positions.len() {
        if visited[seed] {
            continue;
        }
        visited[seed] = true;
        queue.push_back(seed);
        let mut members = Vec::new();

        while let Some(current) = queue.pop_front() {
            members.push(current);
            for (candidate, seen) in visited.iter_mut().enumerate() {
                if *seen {
                    continue;
                }
                if threshold.admits(&positions[current], &positions[candidate]) {
                    *seen = true;
                    queue.push_back(candidate);
                }
            }
        }

        members.sort_unstable();
        clusters.push(Cluster { members });
    }

    clusters
}
