//! Gene representations for the three optimization passes.
//!
//! The kinds share nothing but a calling convention: each can build a fresh
//! gene from a context and rebuild any single element of one.

pub mod hazard;
pub mod room;
pub mod room_type;

use rand_chacha::rand_core::Rng;

use crate::random;

pub use hazard::{HazardChromosome, HazardContext, HazardPlacement, RankedRoom};
pub use room::RoomChromosome;
pub use room_type::RoomTypeChromosome;

pub trait Chromosome: Clone + Sized {
    /// Whatever generation needs beyond the random source.
    type Context: ?Sized;

    fn generate_gene<R: Rng + ?Sized>(rng: &mut R, context: &Self::Context) -> Vec<Self>;

    /// Builds a replacement for this element from scratch, keeping its slot identity.
    fn regenerate<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        context: &Self::Context,
        gene_len: usize,
    ) -> Self;
}

/// Replaces one uniformly chosen element with a regenerated one.
pub fn mutate<C: Chromosome, R: Rng + ?Sized>(
    rng: &mut R,
    context: &C::Context,
    mut gene: Vec<C>,
) -> Vec<C> {
    if gene.is_empty() {
        return gene;
    }
    let slot = random::below(rng, gene.len());
    gene[slot] = gene[slot].regenerate(rng, context, gene.len());
    gene
}
