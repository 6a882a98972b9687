//! Role labels assigned to an already evolved room layout.

use rand_chacha::rand_core::Rng;
use serde::{Deserialize, Serialize};

use crate::random;
use crate::types::RoomType;

use super::{Chromosome, RoomChromosome};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomTypeChromosome {
    pub room: RoomChromosome,
    pub room_type: RoomType,
}

impl RoomTypeChromosome {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R, room: RoomChromosome) -> Self {
        let room_type = *random::pick(rng, &RoomType::ALL);
        Self { room, room_type }
    }
}

impl Chromosome for RoomTypeChromosome {
    /// The room gene being labelled.
    type Context = [RoomChromosome];

    fn generate_gene<R: Rng + ?Sized>(rng: &mut R, rooms: &[RoomChromosome]) -> Vec<Self> {
        rooms.iter().map(|room| Self::generate(rng, room.clone())).collect()
    }

    fn regenerate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        _rooms: &[RoomChromosome],
        _: usize,
    ) -> Self {
        Self::generate(rng, self.room.clone())
    }
}
