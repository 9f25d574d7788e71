//! Fixed-width containment bitsets.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const WORDS: usize = 4;

/// A fixed 256-bit set over column slots.
///
/// Tables mark the slot of every column they own; containment queries build
/// a second mask from the queried kinds and compare word by word.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Mask {
    words: [u64; WORDS],
}

impl Mask {
    /// Number of bits a mask can hold.
    pub const CAPACITY: usize = WORDS * 64;

    /// Creates an empty mask.
    #[must_use]
    pub const fn new() -> Self {
        Self { words: [0; WORDS] }
    }

    /// Creates a mask with the given bits marked.
    ///
    /// # Panics
    ///
    /// Panics if any bit is `>= Mask::CAPACITY`.
    #[must_use]
    pub fn from_bits(bits: impl IntoIterator<Item = usize>) -> Self {
        let mut mask = Self::new();
        for bit in bits {
            mask.mark(bit);
        }
        mask
    }

    /// Sets a bit.
    ///
    /// # Panics
    ///
    /// Panics if `bit >= Mask::CAPACITY`.
    pub fn mark(&mut self, bit: usize) {
        assert!(
            bit < Self::CAPACITY,
            "mask bit {bit} out of range (capacity {})",
            Self::CAPACITY
        );
        self.words[bit / 64] |= 1 << (bit % 64);
    }

    /// Clears a bit. Out-of-range bits are ignored.
    pub fn unmark(&mut self, bit: usize) {
        if bit < Self::CAPACITY {
            self.words[bit / 64] &= !(1 << (bit % 64));
        }
    }

    /// Returns true if `bit` is set. Out-of-range bits are never set.
    #[must_use]
    pub fn contains(&self, bit: usize) -> bool {
        bit < Self::CAPACITY && self.words[bit / 64] & (1 << (bit % 64)) != 0
    }

    /// Returns true if every bit of `other` is set in `self`.
    #[must_use]
    pub fn contains_all(&self, other: &Mask) -> bool {
        self.words
            .iter()
            .zip(&other.words)
            .all(|(mine, theirs)| mine & theirs == *theirs)
    }

    /// Returns true if at least one bit of `other` is set in `self`.
    #[must_use]
    pub fn contains_any(&self, other: &Mask) -> bool {
        self.words
            .iter()
            .zip(&other.words)
            .any(|(mine, theirs)| mine & theirs != 0)
    }

    /// Returns true if no bit of `other` is set in `self`.
    #[must_use]
    pub fn contains_none(&self, other: &Mask) -> bool {
        !self.contains_any(other)
    }

    /// Returns true if no bits are set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// Returns the number of set bits.
    #[must_use]
    pub fn count(&self) -> usize {
        self.words.iter().map(|w| w.count_ones() as usize).sum()
    }

    /// Iterates over the set bits in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        (0..Self::CAPACITY).filter(|bit| self.contains(*bit))
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}
