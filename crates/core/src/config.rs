//! Immutable run configuration shared by every optimization pass.

use std::error::Error;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::evolution::Crossover;
use crate::types::Point;

pub const DEFAULT_MIN_ROOM_SIZE: i32 = 3;
pub const DEFAULT_MAX_ROOM_SIZE: i32 = 10;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LevelConfig {
    pub width: i32,
    pub height: i32,
    pub min_room_size: i32,
    pub max_room_size: i32,
    /// Number of room chromosomes in every room gene.
    pub gene_length: usize,
    pub population_size: usize,
    /// Generation count for each of the three passes.
    pub generations: usize,
    pub seed: u64,
    pub difficulty: f64,
    pub average_room_area: f64,
    /// The entrance room is the one owning the tile closest to this anchor.
    pub entrance: Point,
    pub max_hazards_per_room: usize,
    pub crossover: Crossover,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            width: 32,
            height: 21,
            min_room_size: DEFAULT_MIN_ROOM_SIZE,
            max_room_size: DEFAULT_MAX_ROOM_SIZE,
            gene_length: 10,
            population_size: 20,
            generations: 100,
            seed: 98_779_837,
            difficulty: 60.0,
            average_room_area: f64::from(
                (DEFAULT_MIN_ROOM_SIZE * DEFAULT_MIN_ROOM_SIZE
                    + DEFAULT_MAX_ROOM_SIZE * DEFAULT_MAX_ROOM_SIZE)
                    / 2,
            ),
            entrance: Point { x: 20, y: 25 },
            max_hazards_per_room: 12,
            crossover: Crossover::Uniform,
        }
    }
}

impl LevelConfig {
    /// Checks the preconditions room generation relies on.
    ///
    /// Room origins are drawn from `1..width - min_room_size - 2`, so each
    /// axis needs room for a border, the smallest room and a margin.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_room_size < 1 || self.max_room_size < self.min_room_size {
            return Err(ConfigError::RoomSizeBounds {
                min: self.min_room_size,
                max: self.max_room_size,
            });
        }
        let required = self.min_room_size + 4;
        if self.width < required || self.height < required {
            return Err(ConfigError::GridTooSmall {
                width: self.width,
                height: self.height,
                required,
            });
        }
        if self.gene_length == 0 {
            return Err(ConfigError::EmptyGene);
        }
        if self.population_size == 0 {
            return Err(ConfigError::EmptyPopulation);
        }
        if self.average_room_area.is_nan() || self.average_room_area <= 0.0 {
            return Err(ConfigError::AverageRoomArea(self.average_room_area));
        }
        if !self.difficulty.is_finite() {
            return Err(ConfigError::Difficulty(self.difficulty));
        }
        Ok(())
    }

    pub fn cell_count(&self) -> usize {
        (self.width.max(0) as usize) * (self.height.max(0) as usize)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ConfigError {
    RoomSizeBounds { min: i32, max: i32 },
    GridTooSmall { width: i32, height: i32, required: i32 },
    EmptyGene,
    EmptyPopulation,
    AverageRoomArea(f64),
    Difficulty(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoomSizeBounds { min, max } => {
                write!(f, "room size bounds {min}..={max} are empty or non-positive")
            }
            Self::GridTooSmall { width, height, required } => write!(
                f,
                "grid {width}x{height} cannot fit the minimum room; \
                 both sides must be at least {required}"
            ),
            Self::EmptyGene => write!(f, "gene length must be at least 1"),
            Self::EmptyPopulation => write!(f, "population size must be at least 1"),
            Self::AverageRoomArea(area) => {
                write!(f, "average room area must be positive, got {area}")
            }
            Self::Difficulty(value) => write!(f, "difficulty must be finite, got {value}"),
        }
    }
}

impl Error for ConfigError {}
