//! Allocation of marker identifier offsets, one per live chain (teleop group).
//!
//! Marker identifiers must be unique across a display batch that may show several
//! chains. Each chain gets a random offset once when it is set up, and its elements are
//! numbered `offset + counter`. Offsets of live chains never collide: a drawn offset that
//! is already taken is drawn again.

use std::collections::HashMap;
use rand::Rng;
use tracing::debug;
use crate::kinematic_traits::MarkerId;

/// Offsets are drawn from `0 .. ID_OFFSET_RANGE`.
pub const ID_OFFSET_RANGE: MarkerId = 10_000_000;

#[derive(Debug, Default)]
pub struct OffsetAllocator {
    offsets: HashMap<String, MarkerId>,
}

impl OffsetAllocator {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns the offset of the chain, allocating a new random one if the chain has none.
    /// The offset stays with the chain until it is released.
    pub fn allocate<R: Rng + ?Sized>(&mut self, chain: &str, rng: &mut R) -> MarkerId {
        if let Some(offset) = self.offsets.get(chain) {
            return *offset;
        }
        let offset = loop {
            let candidate = rng.gen_range(0..ID_OFFSET_RANGE);
            if !self.offsets.values().any(|&taken| taken == candidate) {
                break candidate;
            }
            debug!("Identifier offset {} already taken, drawing again", candidate);
        };
        debug!("Allocated identifier offset {} for {}", offset, chain);
        self.offsets.insert(chain.to_string(), offset);
        offset
    }

    /// Frees the offset of the chain so it can be drawn again. Returns the released offset.
    pub fn release(&mut self, chain: &str) -> Option<MarkerId> {
        self.offsets.remove(chain)
    }

    pub fn offset(&self, chain: &str) -> Option<MarkerId> {
        self.offsets.get(chain).copied()
    }

    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }
}
