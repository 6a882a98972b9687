//! Room adjacency graph and breadth-first distance queries.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use crate::types::Centroid;

use super::grid::{all_points, axis_neighbours};
use super::raster::RoomMap;

/// Undirected graph over placed rooms, keyed by room index.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RoomsGraph {
    adjacency: BTreeMap<usize, BTreeSet<usize>>,
}

impl RoomsGraph {
    /// Every placed room becomes a vertex. Two rooms share an edge when they
    /// own orthogonally adjacent cells and both declare the link.
    pub fn new(room_map: &RoomMap) -> Self {
        let mut graph = Self::default();
        for placed in room_map.placed() {
            graph.add_vertex(placed.index);
        }

        let (width, height) = (room_map.width(), room_map.height());
        for pos in all_points(width, height) {
            let Some(current) = room_map.owner_at(pos) else {
                continue;
            };
            for next in axis_neighbours(width, height, pos) {
                let Some(neighbour) = room_map.owner_at(next) else {
                    continue;
                };
                if neighbour == current {
                    continue;
                }
                let linked = room_map
                    .placed_room(current)
                    .zip(room_map.placed_room(neighbour))
                    .is_some_and(|(a, b)| a.links_with(b));
                if linked {
                    graph.add_edge(current, neighbour);
                }
            }
        }
        graph
    }

    pub fn add_vertex(&mut self, vertex: usize) {
        self.adjacency.entry(vertex).or_default();
    }

    pub fn add_edge(&mut self, a: usize, b: usize) {
        self.adjacency.entry(a).or_default().insert(b);
        self.adjacency.entry(b).or_default().insert(a);
    }

    /// Returns whether the edge existed. Both endpoints stay in the graph.
    pub fn remove_edge(&mut self, a: usize, b: usize) -> bool {
        let removed = self.adjacency.get_mut(&a).is_some_and(|neighbours| neighbours.remove(&b));
        if let Some(neighbours) = self.adjacency.get_mut(&b) {
            neighbours.remove(&a);
        }
        removed
    }

    pub fn adjacency(&self) -> &BTreeMap<usize, BTreeSet<usize>> {
        &self.adjacency
    }

    pub fn vertices(&self) -> impl Iterator<Item = usize> + '_ {
        self.adjacency.keys().copied()
    }

    pub fn neighbours(&self, vertex: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency.get(&vertex).into_iter().flatten().copied()
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        self.adjacency.get(&a).is_some_and(|neighbours| neighbours.contains(&b))
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Undirected edge count.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(BTreeSet::len).sum::<usize>() / 2
    }

    /// Whether a traversal from the first vertex reaches all of them. Empty graphs are connected.
    pub fn connected(&self) -> bool {
        let Some(start) = self.vertices().next() else {
            return true;
        };
        let distances = self.distance_map(start);
        self.vertices().all(|vertex| distances.is_reached(vertex))
    }

    /// Hop counts from `start`.
    pub fn distance_map(&self, start: usize) -> DistanceMap {
        self.traverse(start, |_, _| 1.0)
    }

    /// Breadth-first traversal where each discovered edge costs the Manhattan
    /// distance between the two room centres. Distances follow discovery
    /// order, not shortest weighted paths.
    pub fn weighted_distance_map(
        &self,
        start: usize,
        centers: &BTreeMap<usize, Centroid>,
    ) -> DistanceMap {
        self.traverse(start, |from, to| match (centers.get(&from), centers.get(&to)) {
            (Some(a), Some(b)) => a.manhattan(*b),
            _ => 1.0,
        })
    }

    fn traverse(&self, start: usize, weight: impl Fn(usize, usize) -> f64) -> DistanceMap {
        let mut distances: BTreeMap<usize, Option<f64>> =
            self.vertices().map(|vertex| (vertex, None)).collect();
        if !self.adjacency.contains_key(&start) {
            return DistanceMap { distances };
        }

        distances.insert(start, Some(0.0));
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            let base = distances.get(&current).copied().flatten().unwrap_or(0.0);
            for next in self.neighbours(current) {
                let slot = distances.entry(next).or_insert(None);
                if slot.is_none() {
                    *slot = Some(base + weight(current, next));
                    queue.push_back(next);
                }
            }
        }
        DistanceMap { distances }
    }

    /// Longest hop distance between any two mutually reachable rooms.
    pub fn diameter(&self) -> f64 {
        self.vertices()
            .filter_map(|vertex| self.distance_map(vertex).max_reached())
            .fold(0.0, f64::max)
    }

    pub fn average_degree(&self) -> f64 {
        if self.adjacency.is_empty() {
            return 0.0;
        }
        let total: usize = self.adjacency.values().map(BTreeSet::len).sum();
        total as f64 / self.adjacency.len() as f64
    }
}

/// Per-vertex distance from a traversal start; `None` marks a vertex the
/// traversal never reached.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DistanceMap {
    distances: BTreeMap<usize, Option<f64>>,
}

impl DistanceMap {
    pub fn get(&self, vertex: usize) -> Option<f64> {
        self.distances.get(&vertex).copied().flatten()
    }

    pub fn is_reached(&self, vertex: usize) -> bool {
        self.get(vertex).is_some()
    }

    pub fn entries(&self) -> &BTreeMap<usize, Option<f64>> {
        &self.distances
    }

    pub fn reached(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.distances.iter().filter_map(|(&vertex, distance)| distance.map(|d| (vertex, d)))
    }

    pub fn max_reached(&self) -> Option<f64> {
        self.reached().map(|(_, distance)| distance).reduce(f64::max)
    }

    /// Reached vertices ordered by distance, ties by vertex index.
    pub fn ranked(&self) -> Vec<usize> {
        let mut reached: Vec<(usize, f64)> = self.reached().collect();
        reached.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        reached.into_iter().map(|(vertex, _)| vertex).collect()
    }
}
