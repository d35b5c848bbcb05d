use crate::Generator;
use rand::Rng;
use shortlinks_core::{ShortId, ALPHABET};
use std::collections::HashSet;

/// Draws per requested id before giving up on filling a batch.
const DRAWS_PER_ID: usize = 100;

/// Generator sampling each character uniformly from [`ALPHABET`] using the
/// thread-local RNG.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomGenerator;

impl RandomGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl Generator for RandomGenerator {
    fn generate_batch(&self, count: usize, length: usize) -> Vec<ShortId> {
        generate_unique_short_ids(count, length)
    }
}

/// Generates up to `count` distinct random ids of `length` characters.
///
/// Sampling stops once `count` distinct ids are collected or after
/// `count * 100` draws, so tiny namespaces yield short batches instead of
/// spinning forever. Ids keep the order in which they were first drawn.
pub fn generate_unique_short_ids(count: usize, length: usize) -> Vec<ShortId> {
    generate_unique_short_ids_with(&mut rand::rng(), count, length)
}

/// Same as [`generate_unique_short_ids`] with a caller-provided RNG.
pub fn generate_unique_short_ids_with<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    length: usize,
) -> Vec<ShortId> {
    let max_draws = count.saturating_mul(DRAWS_PER_ID);
    let mut seen = HashSet::with_capacity(count);
    let mut ids = Vec::with_capacity(count);
    let mut draws = 0;

    while ids.len() < count && draws < max_draws {
        draws += 1;
        let candidate = random_short_id(rng, length);
        if seen.insert(candidate.clone()) {
            ids.push(ShortId::new_unchecked(candidate));
        }
    }

    ids
}

fn random_short_id<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    (0..length)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect()
}
