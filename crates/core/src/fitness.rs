//! Scoring functions for the three passes. Higher is better for all of them.
//!
//! Every call rebuilds the raster and graph from the gene it is given; no
//! state is carried between evaluations.

use std::collections::{BTreeMap, BTreeSet};
use std::f64::consts::E;

use serde::Serialize;

use crate::chromosome::{HazardChromosome, RoomChromosome, RoomTypeChromosome};
use crate::config::LevelConfig;
use crate::plan::{RoomMap, RoomsGraph};
use crate::types::RoomType;

/// Score for layouts that place fewer than two rooms or split into islands.
pub const LAYOUT_PENALTY: f64 = -1000.0;

const TARGET_DEGREE: f64 = 2.0;
const TARGET_DIAMETER: f64 = 3.0;
const AREA_DIVISOR: f64 = 25.0;
const HOLE_PENALTY: f64 = 100.0;

const NEIGHBOUR_BONUS: f64 = 10.0;
const CORRIDOR_CONNECTION_BONUS: f64 = 500.0;
const SIZE_BONUS: f64 = 1000.0;
const SINGLE_DOOR_BONUS: f64 = 1000.0;
const HALL_MIN_AREA: usize = 20;
const KITCHEN_AREA_BOUNDS: (usize, usize) = (15, 30);
const BATHROOM_MAX_AREA: usize = 15;
const STORAGE_MAX_AREA: usize = 10;

/// Measurements of a rasterized layout that feed the layout score.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LayoutMetrics {
    pub rooms: usize,
    pub connected: bool,
    pub narrow_cells: usize,
    pub tiny_cells: usize,
    pub building_area: usize,
    pub holes: usize,
    pub average_degree: f64,
    pub diameter: f64,
}

impl LayoutMetrics {
    pub fn measure(room_map: &RoomMap) -> Self {
        let graph = RoomsGraph::new(room_map);
        Self {
            rooms: room_map.room_count(),
            connected: graph.connected(),
            narrow_cells: room_map.narrow_corridors().len(),
            tiny_cells: room_map.tiny_corridors().len(),
            building_area: room_map.building_area(),
            holes: room_map.holes().len(),
            average_degree: graph.average_degree(),
            diameter: graph.diameter(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.rooms < 2 || !self.connected
    }

    pub fn score(&self) -> f64 {
        if self.is_degenerate() {
            return LAYOUT_PENALTY;
        }
        let degree_term = (-(self.average_degree - TARGET_DEGREE).powi(2)).exp();
        let diameter_term = (-(self.diameter - TARGET_DIAMETER).powi(2)).exp();
        let shape = degree_term * self.rooms as f64 * diameter_term;
        let corridor_damping =
            (E + self.narrow_cells as f64).ln() * 10_f64.powi(self.tiny_cells as i32);
        shape / corridor_damping + self.building_area as f64 / AREA_DIVISOR
            - HOLE_PENALTY * self.holes as f64
    }
}

/// Rewards a connected layout of several rooms with average degree near 2
/// and diameter near 3, a large footprint, few corridor cells and no holes.
pub fn room_layout_fitness(gene: &[RoomChromosome], config: &LevelConfig) -> f64 {
    LayoutMetrics::measure(&RoomMap::from_config(config, gene)).score()
}

/// Sums per-room bonuses for neighbour labels, connection counts and area.
pub fn room_type_fitness(gene: &[RoomTypeChromosome], config: &LevelConfig) -> f64 {
    let rooms: Vec<RoomChromosome> = gene.iter().map(|label| label.room.clone()).collect();
    let room_map = RoomMap::from_config(config, &rooms);
    let areas = room_map.rooms_area();
    let graph = RoomsGraph::new(&room_map);
    let labels: BTreeMap<usize, RoomType> =
        gene.iter().map(|label| (label.room.index, label.room_type)).collect();

    let mut fitness = 0.0;
    for (&room, neighbours) in graph.adjacency() {
        let Some(&room_type) = labels.get(&room) else {
            continue;
        };
        let neighbour_types: BTreeSet<RoomType> =
            neighbours.iter().filter_map(|neighbour| labels.get(neighbour).copied()).collect();
        let area = areas.get(&room).copied().unwrap_or(0);
        fitness += room_type_bonus(room_type, area, neighbours.len(), &neighbour_types);
    }
    fitness
}

fn room_type_bonus(
    room_type: RoomType,
    area: usize,
    connections: usize,
    neighbours: &BTreeSet<RoomType>,
) -> f64 {
    let next_to = |wanted: &[RoomType]| {
        wanted.iter().filter(|label| neighbours.contains(label)).count() as f64 * NEIGHBOUR_BONUS
    };
    let bonus_if = |condition: bool, bonus: f64| if condition { bonus } else { 0.0 };

    match room_type {
        RoomType::Corridor => {
            next_to(&[RoomType::Bathroom, RoomType::Kitchen])
                + CORRIDOR_CONNECTION_BONUS * connections as f64
        }
        RoomType::Hall => {
            next_to(&[RoomType::Storage, RoomType::Bathroom, RoomType::Kitchen])
                + bonus_if(area > HALL_MIN_AREA, SIZE_BONUS)
        }
        RoomType::Kitchen => {
            let (low, high) = KITCHEN_AREA_BOUNDS;
            next_to(&[RoomType::Storage, RoomType::Bathroom])
                + bonus_if(low < area && area < high, SIZE_BONUS)
        }
        RoomType::Bathroom => {
            bonus_if(area < BATHROOM_MAX_AREA, SIZE_BONUS)
                + bonus_if(connections == 1, SINGLE_DOOR_BONUS)
        }
        RoomType::Storage => bonus_if(area < STORAGE_MAX_AREA, SIZE_BONUS),
    }
}

/// Difficulty a room should carry: proportional to its size and growing
/// slowly with its distance rank from the entrance.
pub fn target_difficulty(config: &LevelConfig, tiles: usize, rank: usize) -> f64 {
    config.difficulty * (tiles as f64 / config.average_room_area) * (rank as f64 + 4.0).log(4.0)
}

/// Negated total deviation between target and observed difficulty.
pub fn hazard_fitness(gene: &[HazardChromosome], config: &LevelConfig) -> f64 {
    -gene
        .iter()
        .map(|room| {
            let target = target_difficulty(config, room.room_tiles.len(), room.rank);
            (target - room.observed_difficulty()).abs()
        })
        .sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chromosome::HazardPlacement;
    use crate::types::{HazardKind, Layering, Point, Rect};

    fn room(index: usize, rect: Rect, links: &[usize], len: usize) -> RoomChromosome {
        let mut connected = vec![false; len];
        for &other in links {
            connected[other] = true;
        }
        RoomChromosome { index, rect, layering: Layering::Under, connected }
    }

    fn grid(width: i32, height: i32) -> LevelConfig {
        LevelConfig { width, height, ..LevelConfig::default() }
    }

    #[test]
    fn separated_rooms_are_penalized() {
        let gene = [
            room(0, Rect { x: 0, y: 0, w: 3, h: 3 }, &[1], 2),
            room(1, Rect { x: 6, y: 6, w: 3, h: 3 }, &[0], 2),
        ];
        assert_eq!(room_layout_fitness(&gene, &grid(10, 10)), LAYOUT_PENALTY);
    }

    #[test]
    fn single_full_grid_room_is_penalized() {
        let gene = [room(0, Rect { x: 0, y: 0, w: 10, h: 10 }, &[], 1)];
        assert_eq!(room_layout_fitness(&gene, &grid(10, 10)), LAYOUT_PENALTY);
    }

    #[test]
    fn adjacent_linked_rooms_score_the_closed_form() {
        let gene = [
            room(0, Rect { x: 0, y: 0, w: 4, h: 4 }, &[1], 2),
            room(1, Rect { x: 4, y: 0, w: 4, h: 4 }, &[0], 2),
        ];
        let metrics = LayoutMetrics::measure(&RoomMap::new(10, 10, &gene));
        assert_eq!(metrics.rooms, 2);
        assert_eq!(metrics.average_degree, 1.0);
        assert_eq!(metrics.diameter, 1.0);
        assert_eq!((metrics.narrow_cells, metrics.tiny_cells, metrics.holes), (0, 0, 0));

        let expected = (-1.0_f64).exp() * 2.0 * (-4.0_f64).exp() + 32.0 / 25.0;
        let actual = room_layout_fitness(&gene, &grid(10, 10));
        assert!((actual - expected).abs() < 1e-9, "{actual} != {expected}");
    }

    #[test]
    fn holes_cost_a_hundred_each() {
        let all = [0, 1, 2, 3];
        let frame = [
            room(0, Rect { x: 0, y: 0, w: 9, h: 3 }, &all, 4),
            room(1, Rect { x: 0, y: 6, w: 9, h: 3 }, &all, 4),
            room(2, Rect { x: 0, y: 3, w: 3, h: 3 }, &all, 4),
            room(3, Rect { x: 6, y: 3, w: 3, h: 3 }, &all, 4),
        ];
        let metrics = LayoutMetrics::measure(&RoomMap::new(9, 9, &frame));
        let mut filled = metrics;
        filled.holes = 0;
        assert!(metrics.connected);
        assert_eq!(metrics.holes, 9);
        assert!((filled.score() - metrics.score() - 100.0 * metrics.holes as f64).abs() < 1e-9);
    }

    fn labelled(rooms: &[RoomChromosome], types: &[RoomType]) -> Vec<RoomTypeChromosome> {
        rooms
            .iter()
            .zip(types)
            .map(|(room, &room_type)| RoomTypeChromosome { room: room.clone(), room_type })
            .collect()
    }

    fn corridor_with_bathroom() -> Vec<RoomChromosome> {
        vec![
            room(0, Rect { x: 0, y: 0, w: 6, h: 2 }, &[1], 2),
            room(1, Rect { x: 0, y: 2, w: 3, h: 3 }, &[0], 2),
        ]
    }

    #[test]
    fn corridor_next_to_small_bathroom() {
        let gene = labelled(&corridor_with_bathroom(), &[RoomType::Corridor, RoomType::Bathroom]);
        // Corridor: bathroom neighbour 10 + one connection 500.
        // Bathroom: area 9 < 15 and exactly one door.
        assert_eq!(room_type_fitness(&gene, &grid(10, 10)), 510.0 + 2000.0);
    }

    #[test]
    fn storage_and_hall_thresholds() {
        let rooms = [
            room(0, Rect { x: 0, y: 0, w: 7, h: 3 }, &[1], 2),
            room(1, Rect { x: 0, y: 3, w: 3, h: 3 }, &[0], 2),
        ];
        let gene = labelled(&rooms, &[RoomType::Hall, RoomType::Storage]);
        // Hall area 21 > 20 plus storage neighbour; storage area 9 < 10.
        assert_eq!(room_type_fitness(&gene, &grid(10, 10)), 1010.0 + 1000.0);

        let gene = labelled(&rooms, &[RoomType::Kitchen, RoomType::Kitchen]);
        // Area 21 lies inside the kitchen band; area 9 does not.
        assert_eq!(room_type_fitness(&gene, &grid(10, 10)), 1000.0);
    }

    #[test]
    fn unplaced_rooms_earn_nothing() {
        let rooms = [
            room(0, Rect { x: 0, y: 0, w: 3, h: 3 }, &[], 2),
            room(1, Rect { x: 1, y: 1, w: 3, h: 3 }, &[], 2),
        ];
        let overlapping = [
            room(0, Rect { x: 0, y: 0, w: 5, h: 5 }, &[], 2),
            room(1, Rect { x: 2, y: 2, w: 2, h: 2 }, &[], 2),
        ];
        let gene = labelled(&rooms, &[RoomType::Storage, RoomType::Storage]);
        assert_eq!(room_type_fitness(&gene, &grid(10, 10)), 2000.0);

        // The second room is fully covered and Under, so only the first counts.
        let gene = labelled(&overlapping, &[RoomType::Storage, RoomType::Storage]);
        assert_eq!(room_type_fitness(&gene, &grid(10, 10)), 0.0);
    }

    fn hazard_room(rank: usize, tiles: usize, kinds: &[HazardKind]) -> HazardChromosome {
        let room_tiles: Vec<Point> = (0..tiles as i32).map(|x| Point { x, y: 0 }).collect();
        let hazards = kinds
            .iter()
            .zip(&room_tiles)
            .map(|(&kind, &tile)| HazardPlacement { tile, kind })
            .collect();
        HazardChromosome { rank, room: rank, room_tiles, hazards }
    }

    #[test]
    fn hazard_fitness_measures_distance_from_target() {
        let config =
            LevelConfig { difficulty: 60.0, average_room_area: 54.0, ..LevelConfig::default() };
        // Rank 0 with an average sized room targets exactly the difficulty.
        let kinds = [HazardKind::Brute, HazardKind::Hound, HazardKind::MeleeStatic];
        let exact = hazard_room(0, 54, &kinds);
        assert!((target_difficulty(&config, 54, 0) - 60.0).abs() < 1e-9);
        assert!((hazard_fitness(&[exact], &config) - -(9.0 + 150.0 - 60.0)).abs() < 1e-9);

        // Rank 12 doubles the target: log4(16) = 2.
        let empty = hazard_room(12, 54, &[]);
        assert!((hazard_fitness(&[empty], &config) - -120.0).abs() < 1e-9);
        assert_eq!(hazard_fitness(&[], &config), 0.0);
    }
}
