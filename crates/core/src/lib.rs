pub mod chromosome;
pub mod config;
pub mod evolution;
pub mod fitness;
pub mod pipeline;
pub mod plan;
pub mod random;
pub mod types;

pub use chromosome::{Chromosome, HazardChromosome, RoomChromosome, RoomTypeChromosome};
pub use config::{ConfigError, LevelConfig};
pub use evolution::{Crossover, EvolutionError, Generation, GeneticAlgorithm, Scored};
pub use pipeline::{GeneratedLevel, PassScores, PipelineError, generate_level};
pub use plan::{DistanceMap, RoomMap, RoomsGraph};
pub use types::*;
