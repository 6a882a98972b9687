//! The three evolution passes chained into a full level: room layout, room
//! labels, then hazards ranked outward from the entrance.
//!
//! One `ChaCha8Rng` seeded from the config drives every pass in order, so a
//! config always yields the same level.

use std::collections::BTreeSet;
use std::error::Error;
use std::fmt;

use rand_chacha::rand_core::Rng;
use serde::Serialize;
use xxhash_rust::xxh3::xxh3_64;

use crate::chromosome::{
    self, Chromosome, HazardChromosome, HazardContext, HazardPlacement, RoomChromosome,
    RoomTypeChromosome,
};
use crate::config::{ConfigError, LevelConfig};
use crate::evolution::{EvolutionError, Generation, GeneticAlgorithm, Scored};
use crate::fitness::{self, LAYOUT_PENALTY, LayoutMetrics};
use crate::plan::RoomMap;
use crate::random;
use crate::types::Point;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pass {
    Rooms,
    RoomTypes,
    Hazards,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Pass::Rooms => "rooms",
            Pass::RoomTypes => "room types",
            Pass::Hazards => "hazards",
        })
    }
}

#[derive(Debug)]
pub enum PipelineError {
    Config(ConfigError),
    Evolution { pass: Pass, source: EvolutionError },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "invalid level config: {err}"),
            Self::Evolution { pass, source } => write!(f, "{pass} pass failed: {source}"),
        }
    }
}

impl Error for PipelineError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Evolution { source, .. } => Some(source),
        }
    }
}

impl From<ConfigError> for PipelineError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct PassScores {
    pub layout: f64,
    pub room_types: f64,
    pub hazards: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GeneratedLevel {
    pub width: i32,
    pub height: i32,
    pub seed: u64,
    /// Winning room gene; rasterize it with [`GeneratedLevel::room_map`].
    pub rooms: Vec<RoomChromosome>,
    pub room_types: Vec<RoomTypeChromosome>,
    /// Ordered by distance rank from the entrance room.
    pub hazards: Vec<HazardChromosome>,
    pub entrance_room: Option<usize>,
    pub metrics: LayoutMetrics,
    pub scores: PassScores,
}

impl GeneratedLevel {
    pub fn room_map(&self) -> RoomMap {
        RoomMap::new(self.width, self.height, &self.rooms)
    }

    pub fn hazard_placements(&self) -> impl Iterator<Item = &HazardPlacement> + '_ {
        self.hazards.iter().flat_map(|room| &room.hazards)
    }

    pub fn canonical_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend((self.width as u32).to_le_bytes());
        bytes.extend((self.height as u32).to_le_bytes());
        for owner in self.room_map().grid() {
            let owner = owner.map_or(u32::MAX, |room| room as u32);
            bytes.extend(owner.to_le_bytes());
        }

        bytes.extend((self.room_types.len() as u32).to_le_bytes());
        for label in &self.room_types {
            bytes.extend((label.room.index as u32).to_le_bytes());
            bytes.push(label.room_type as u8);
        }

        bytes.extend(self.entrance_room.map_or(u32::MAX, |room| room as u32).to_le_bytes());
        bytes.extend((self.hazards.len() as u32).to_le_bytes());
        for room in &self.hazards {
            bytes.extend((room.room as u32).to_le_bytes());
            bytes.extend((room.hazards.len() as u32).to_le_bytes());
            for hazard in &room.hazards {
                bytes.push(hazard.kind as u8);
                bytes.extend(hazard.tile.y.to_le_bytes());
                bytes.extend(hazard.tile.x.to_le_bytes());
            }
        }
        bytes
    }

    pub fn fingerprint(&self) -> u64 {
        xxh3_64(&self.canonical_bytes())
    }
}

pub fn generate_level(config: &LevelConfig) -> Result<GeneratedLevel, PipelineError> {
    generate_level_with_occupied(config, &BTreeSet::new(), |_| {})
}

/// Like [`generate_level`], showing `observer` every generation of the room pass.
pub fn generate_level_observed(
    config: &LevelConfig,
    observer: impl FnMut(&Generation<'_, RoomChromosome>),
) -> Result<GeneratedLevel, PipelineError> {
    generate_level_with_occupied(config, &BTreeSet::new(), observer)
}

/// Runs all three passes. Tiles in `occupied` (furniture placed by a later
/// stage) never receive hazards.
pub fn generate_level_with_occupied(
    config: &LevelConfig,
    occupied: &BTreeSet<Point>,
    observer: impl FnMut(&Generation<'_, RoomChromosome>),
) -> Result<GeneratedLevel, PipelineError> {
    config.validate()?;
    let mut rng = random::seeded_rng(config.seed);

    let rooms = evolve_rooms(&mut rng, config, observer)?;
    let room_types = evolve_room_types(&mut rng, config, &rooms.gene)?;

    let room_map = RoomMap::from_config(config, &rooms.gene);
    let entrance_room = room_map.nearest_room(config.entrance);
    let context = match entrance_room {
        Some(entrance) => HazardContext::from_layout(
            &room_map,
            entrance,
            occupied,
            config.max_hazards_per_room,
        ),
        None => HazardContext { rooms: Vec::new(), max_hazards_per_room: 0 },
    };
    let hazards = evolve_hazards(&mut rng, config, &context)?;

    Ok(GeneratedLevel {
        width: config.width,
        height: config.height,
        seed: config.seed,
        metrics: LayoutMetrics::measure(&room_map),
        scores: PassScores {
            layout: rooms.fitness,
            room_types: room_types.fitness,
            hazards: hazards.fitness,
        },
        rooms: rooms.gene,
        room_types: room_types.gene,
        hazards: hazards.gene,
        entrance_room,
    })
}

pub fn evolve_rooms<R: Rng + ?Sized>(
    rng: &mut R,
    config: &LevelConfig,
    observer: impl FnMut(&Generation<'_, RoomChromosome>),
) -> Result<Scored<RoomChromosome>, PipelineError> {
    let _span = tracing::info_span!("pass", pass = %Pass::Rooms).entered();
    let initial: Vec<Vec<RoomChromosome>> = (0..config.population_size)
        .map(|_| RoomChromosome::generate_gene(rng, config))
        .collect();
    let crossover = config.crossover;
    let best = GeneticAlgorithm::new(
        initial,
        |rng, gene| chromosome::mutate(rng, config, gene),
        move |rng, first, second| crossover.breed(rng, first, second),
        |gene| fitness::room_layout_fitness(gene, config),
        rng,
    )
    .map_err(|source| PipelineError::Evolution { pass: Pass::Rooms, source })?
    .run_observed(config.generations, observer);

    let placed = RoomMap::from_config(config, &best.gene).room_count();
    if best.fitness <= LAYOUT_PENALTY {
        tracing::warn!(fitness = best.fitness, placed, "best layout is still penalized");
    }
    tracing::info!(fitness = best.fitness, placed, "pass complete");
    Ok(best)
}

pub fn evolve_room_types<R: Rng + ?Sized>(
    rng: &mut R,
    config: &LevelConfig,
    rooms: &[RoomChromosome],
) -> Result<Scored<RoomTypeChromosome>, PipelineError> {
    let _span = tracing::info_span!("pass", pass = %Pass::RoomTypes).entered();
    let initial: Vec<Vec<RoomTypeChromosome>> = (0..config.population_size)
        .map(|_| RoomTypeChromosome::generate_gene(rng, rooms))
        .collect();
    let crossover = config.crossover;
    let best = GeneticAlgorithm::new(
        initial,
        |rng, gene| chromosome::mutate(rng, rooms, gene),
        move |rng, first, second| crossover.breed(rng, first, second),
        |gene| fitness::room_type_fitness(gene, config),
        rng,
    )
    .map_err(|source| PipelineError::Evolution { pass: Pass::RoomTypes, source })?
    .run(config.generations);

    tracing::info!(fitness = best.fitness, labels = best.gene.len(), "pass complete");
    Ok(best)
}

pub fn evolve_hazards<R: Rng + ?Sized>(
    rng: &mut R,
    config: &LevelConfig,
    context: &HazardContext,
) -> Result<Scored<HazardChromosome>, PipelineError> {
    let _span = tracing::info_span!("pass", pass = %Pass::Hazards).entered();
    let initial: Vec<Vec<HazardChromosome>> = (0..config.population_size)
        .map(|_| HazardChromosome::generate_gene(rng, context))
        .collect();
    let crossover = config.crossover;
    let best = GeneticAlgorithm::new(
        initial,
        |rng, gene| chromosome::mutate(rng, context, gene),
        move |rng, first, second| crossover.breed(rng, first, second),
        |gene| fitness::hazard_fitness(gene, config),
        rng,
    )
    .map_err(|source| PipelineError::Evolution { pass: Pass::Hazards, source })?
    .run(config.generations);

    let placed: usize = best.gene.iter().map(|room| room.hazards.len()).sum();
    tracing::info!(fitness = best.fitness, rooms = best.gene.len(), placed, "pass complete");
    Ok(best)
}
