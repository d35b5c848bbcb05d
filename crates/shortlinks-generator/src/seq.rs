use crate::Generator;
use shortlinks_core::{ShortId, ALPHABET};
use std::sync::atomic::{AtomicU64, Ordering};

/// A deterministic generator walking the namespace in order.
///
/// Each id is the next counter value written in base 62 over [`ALPHABET`]
/// and left-padded with `'0'` to the requested length: at length 3 the
/// sequence is `000`, `001`, ..., `00Z`, `010`, ... Counter values that do
/// not fit in `length` characters end the batch early.
///
/// Useful for fixtures and tests where reproducible ids matter more than
/// unpredictability.
#[derive(Debug)]
pub struct SequenceGenerator {
    counter: AtomicU64,
}

impl Clone for SequenceGenerator {
    fn clone(&self) -> Self {
        Self {
            counter: AtomicU64::new(self.counter.load(Ordering::SeqCst)),
        }
    }
}

impl SequenceGenerator {
    pub fn new() -> Self {
        Self::with_offset(0)
    }

    /// Creates a generator whose first id encodes `offset`.
    pub fn with_offset(offset: u64) -> Self {
        Self {
            counter: AtomicU64::new(offset),
        }
    }
}

impl Default for SequenceGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl Generator for SequenceGenerator {
    fn generate_batch(&self, count: usize, length: usize) -> Vec<ShortId> {
        let capacity = namespace_size(length);
        let mut ids = Vec::with_capacity(count);

        for _ in 0..count {
            let value = self.counter.fetch_add(1, Ordering::SeqCst);
            if capacity.is_some_and(|capacity| value >= capacity) {
                break;
            }
            ids.push(ShortId::new_unchecked(encode(value, length)));
        }

        ids
    }
}

/// Number of ids of `length` characters, or `None` if it exceeds `u64`.
fn namespace_size(length: usize) -> Option<u64> {
    let exponent = u32::try_from(length).ok()?;
    (ALPHABET.len() as u64).checked_pow(exponent)
}

fn encode(mut value: u64, length: usize) -> String {
    let base = ALPHABET.len() as u64;
    let mut chars = vec![ALPHABET[0]; length];

    for slot in chars.iter_mut().rev() {
        if value == 0 {
            break;
        }
        *slot = ALPHABET[(value % base) as usize];
        value /= base;
    }

    chars.into_iter().map(char::from).collect()
}
