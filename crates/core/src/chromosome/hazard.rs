//! Hazard placement per reachable room, ranked by distance from the entrance.

use std::collections::BTreeSet;

use rand_chacha::rand_core::Rng;
use serde::{Deserialize, Serialize};

use crate::plan::{RoomMap, RoomsGraph};
use crate::random;
use crate::types::{HazardKind, Point};

use super::Chromosome;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardPlacement {
    pub tile: Point,
    pub kind: HazardKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HazardChromosome {
    /// Position of the room in the distance ranking; the entrance room is 0.
    pub rank: usize,
    pub room: usize,
    /// Free tiles of the room that hazards may occupy.
    pub room_tiles: Vec<Point>,
    pub hazards: Vec<HazardPlacement>,
}

impl HazardChromosome {
    /// Draws a hazard count below `min(max_hazards, free tiles)`, then that
    /// many distinct tiles, each with a uniformly chosen kind.
    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        rank: usize,
        room: usize,
        room_tiles: Vec<Point>,
        max_hazards: usize,
    ) -> Self {
        let cap = max_hazards.min(room_tiles.len());
        let count = if cap == 0 { 0 } else { random::below(rng, cap) };
        let hazards = random::sample_indices(rng, room_tiles.len(), count)
            .into_iter()
            .map(|slot| HazardPlacement {
                tile: room_tiles[slot],
                kind: *random::pick(rng, &HazardKind::ALL),
            })
            .collect();
        Self { rank, room, room_tiles, hazards }
    }

    /// Difficulty actually placed in the room: the squared hazard count plus
    /// every hazard's weight.
    pub fn observed_difficulty(&self) -> f64 {
        let count = self.hazards.len() as f64;
        count * count + self.hazards.iter().map(|hazard| hazard.kind.weight()).sum::<f64>()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RankedRoom {
    pub room: usize,
    pub tiles: Vec<Point>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HazardContext {
    /// Rooms in ranking order.
    pub rooms: Vec<RankedRoom>,
    pub max_hazards_per_room: usize,
}

impl HazardContext {
    /// Ranks the rooms reachable from `entrance` by centre-weighted traversal
    /// distance and strips `occupied` tiles from each room.
    pub fn from_layout(
        room_map: &RoomMap,
        entrance: usize,
        occupied: &BTreeSet<Point>,
        max_hazards_per_room: usize,
    ) -> Self {
        let graph = RoomsGraph::new(room_map);
        let distances = graph.weighted_distance_map(entrance, &room_map.rooms_centers());
        let mut rooms_tiles = room_map.rooms_tiles();
        let rooms = distances
            .ranked()
            .into_iter()
            .map(|room| {
                let tiles = rooms_tiles
                    .remove(&room)
                    .unwrap_or_default()
                    .into_iter()
                    .filter(|tile| !occupied.contains(tile))
                    .collect();
                RankedRoom { room, tiles }
            })
            .collect();
        Self { rooms, max_hazards_per_room }
    }
}

impl Chromosome for HazardChromosome {
    type Context = HazardContext;

    fn generate_gene<R: Rng + ?Sized>(rng: &mut R, context: &HazardContext) -> Vec<Self> {
        context
            .rooms
            .iter()
            .enumerate()
            .map(|(rank, ranked)| {
                let tiles = ranked.tiles.clone();
                Self::generate(rng, rank, ranked.room, tiles, context.max_hazards_per_room)
            })
            .collect()
    }

    fn regenerate<R: Rng + ?Sized>(&self, rng: &mut R, context: &HazardContext, _: usize) -> Self {
        let tiles = self.room_tiles.clone();
        Self::generate(rng, self.rank, self.room, tiles, context.max_hazards_per_room)
    }
}
