//! Short id generators.
//!
//! Generators are pure: they never look at storage. Uniqueness against the
//! backend is the manager's job; a generator only promises that the ids in
//! one batch are distinct.

pub mod random;
pub mod seq;

pub use random::{generate_unique_short_ids, generate_unique_short_ids_with, RandomGenerator};
pub use seq::SequenceGenerator;

use shortlinks_core::ShortId;

/// Produces batches of candidate short ids.
pub trait Generator: Send + Sync + 'static {
    /// Returns up to `count` distinct ids of exactly `length` characters.
    ///
    /// The batch may be shorter than `count` when the namespace at `length`
    /// is too small to supply that many distinct ids.
    fn generate_batch(&self, count: usize, length: usize) -> Vec<ShortId>;
}
