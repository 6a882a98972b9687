//! Room geometry and declared connectivity.

use rand_chacha::rand_core::Rng;
use serde::{Deserialize, Serialize};

use crate::config::LevelConfig;
use crate::random;
use crate::types::{Layering, Rect};

use super::Chromosome;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomChromosome {
    /// Slot in the gene; doubles as raster owner value and graph vertex id.
    pub index: usize,
    pub rect: Rect,
    pub layering: Layering,
    /// One flag per room slot: whether this room wants a door to that room.
    pub connected: Vec<bool>,
}

impl RoomChromosome {
    pub fn wants(&self, other: usize) -> bool {
        self.connected.get(other).copied().unwrap_or(false)
    }

    /// Both rooms declare the link.
    pub fn links_with(&self, other: &RoomChromosome) -> bool {
        self.wants(other.index) && other.wants(self.index)
    }

    pub fn generate<R: Rng + ?Sized>(
        rng: &mut R,
        config: &LevelConfig,
        index: usize,
        gene_len: usize,
    ) -> Self {
        let min = config.min_room_size;
        let x = random::in_range(rng, 1, config.width - min - 2);
        let y = random::in_range(rng, 1, config.height - min - 2);
        let w = random::in_range(rng, min, (config.width - x).min(config.max_room_size + 1));
        let h = random::in_range(rng, min, (config.height - y).min(config.max_room_size + 1));
        let layering = if random::coin(rng) { Layering::Over } else { Layering::Under };
        let connected = (0..gene_len).map(|_| random::coin(rng)).collect();
        Self { index, rect: Rect { x, y, w, h }, layering, connected }
    }
}

impl Chromosome for RoomChromosome {
    type Context = LevelConfig;

    fn generate_gene<R: Rng + ?Sized>(rng: &mut R, config: &LevelConfig) -> Vec<Self> {
        (0..config.gene_length)
            .map(|index| Self::generate(rng, config, index, config.gene_length))
            .collect()
    }

    fn regenerate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        config: &LevelConfig,
        gene_len: usize,
    ) -> Self {
        Self::generate(rng, config, self.index, gene_len)
    }
}
