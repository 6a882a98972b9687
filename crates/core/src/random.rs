//! Draw helpers over an explicitly threaded random source, plus stream derivation.
//!
//! Every helper borrows the generator mutably; nothing in the crate keeps a
//! generator of its own, so one seed and one call sequence reproduce a run.

use rand::seq::index;
use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};

pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Independent generator for `stream`, stable regardless of how many other
/// streams were derived or consumed before it.
pub fn stream_rng(seed: u64, stream: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(mix_seed_stream(seed, stream))
}

pub fn mix_seed_stream(seed: u64, stream: u64) -> u64 {
    let mut mixed = seed ^ stream.wrapping_mul(0xD6E8_FD9A_5B89_7A4D);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xFF51_AFD7_ED55_8CCD);
    mixed ^= mixed >> 33;
    mixed = mixed.wrapping_mul(0xC4CE_B9FE_1A85_EC53);
    mixed ^ (mixed >> 33)
}

/// Uniform index in `0..bound`.
pub fn below<R: Rng + ?Sized>(rng: &mut R, bound: usize) -> usize {
    debug_assert!(bound > 0);
    (rng.next_u64() % bound as u64) as usize
}

/// Uniform value in the half-open range `low..high`.
pub fn in_range<R: Rng + ?Sized>(rng: &mut R, low: i32, high: i32) -> i32 {
    debug_assert!(low < high);
    let span = high.abs_diff(low) as u64;
    low + (rng.next_u64() % span) as i32
}

pub fn coin<R: Rng + ?Sized>(rng: &mut R) -> bool {
    rng.next_u32() & 1 == 0
}

pub fn pick<'a, T, R: Rng + ?Sized>(rng: &mut R, items: &'a [T]) -> &'a T {
    &items[below(rng, items.len())]
}

/// `amount` distinct indices from `0..len`; asking for more than `len` yields all of them.
pub fn sample_indices<R: Rng + ?Sized>(rng: &mut R, len: usize, amount: usize) -> Vec<usize> {
    index::sample(rng, len, amount.min(len)).into_vec()
}
