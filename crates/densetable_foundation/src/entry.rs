//! Entry identifiers with recycle generations.

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Stable identity of a stored record.
///
/// Valid identities start at 1. Identity 0 marks a tombstoned slot in an
/// entry index.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EntryId(pub u32);

impl EntryId {
    /// The tombstone identity.
    pub const TOMBSTONE: EntryId = EntryId(0);

    /// Returns the raw identity.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns true unless this is the tombstone identity.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }

    /// Returns the identity's slot in an entry index (`identity - 1`), or
    /// `None` for the tombstone.
    #[must_use]
    pub const fn slot(self) -> Option<usize> {
        match self.0 {
            0 => None,
            n => Some((n - 1) as usize),
        }
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "EntryId({})", self.0)
        } else {
            write!(f, "EntryId(tombstone)")
        }
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entry({})", self.0)
    }
}

/// An identity plus its recycle generation and current row position.
///
/// The generation increments each time the identity is reissued, so a
/// long-lived copy of an `Entry` can detect that its identity now belongs to
/// a different record.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Entry {
    id: EntryId,
    recycled: u32,
    row: usize,
}

impl Entry {
    /// Creates an entry.
    #[must_use]
    pub const fn new(id: EntryId, recycled: u32, row: usize) -> Self {
        Self { id, recycled, row }
    }

    /// Returns the entry's identity.
    #[must_use]
    pub const fn id(&self) -> EntryId {
        self.id
    }

    /// Returns how many times this identity has been reissued.
    #[must_use]
    pub const fn recycled(&self) -> u32 {
        self.recycled
    }

    /// Returns the entry's row in its owning table.
    #[must_use]
    pub const fn row(&self) -> usize {
        self.row
    }

    /// Returns true unless the entry is tombstoned.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.id.is_valid()
    }

    /// Returns a copy of this entry positioned at `row`.
    #[must_use]
    pub const fn at_row(self, row: usize) -> Self {
        Self { row, ..self }
    }
}
