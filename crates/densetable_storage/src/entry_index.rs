//! Entry lifecycle management with recyclable identities.
//!
//! The `EntryIndex` is the identity authority for table rows. It maps each
//! identity to the row it currently occupies, and hands freed identities
//! back out (oldest first) with their recycle generation bumped.

use std::cell::{Ref, RefCell, RefMut};
use std::collections::VecDeque;
use std::rc::Rc;

use densetable_foundation::{Entry, EntryId, Error, Result};

/// Tracks every identity handed out and the pool of recyclable ones.
#[derive(Debug, Clone, Default)]
pub struct EntryIndex {
    /// Last identity minted.
    current: u32,
    /// Indexed by `identity - 1`. Tombstoned slots hold identity 0.
    entries: Vec<Entry>,
    /// Identities waiting to be reissued, in recycle order.
    recyclable: VecDeque<Entry>,
}

impl EntryIndex {
    /// Creates an empty entry index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Issues `count` entries, reusing recycled identities first.
    ///
    /// Reused identities keep their slot and have their generation bumped.
    /// Row positions are left at 0 for the caller to assign with
    /// [`update_index`](Self::update_index).
    ///
    /// # Errors
    ///
    /// Returns a batch operation error if `count` is zero.
    ///
    /// # Panics
    ///
    /// Panics if the identity space (`u32`) is exhausted.
    pub fn new_entries(&mut self, count: usize) -> Result<Vec<Entry>> {
        if count == 0 {
            return Err(Error::batch_operation(count));
        }
        let reused = count.min(self.recyclable.len());
        let mut issued = Vec::with_capacity(count);

        for recycled in self.recyclable.drain(..reused) {
            let entry = Entry::new(recycled.id(), recycled.recycled() + 1, 0);
            if let Some(slot) = entry.id().slot() {
                self.entries[slot] = entry;
            }
            issued.push(entry);
        }

        for _ in reused..count {
            self.current = self
                .current
                .checked_add(1)
                .expect("entry identity space exhausted");
            let entry = Entry::new(EntryId(self.current), 0, 0);
            self.entries.push(entry);
            issued.push(entry);
        }

        Ok(issued)
    }

    /// Records that `id` now lives at `row`.
    ///
    /// The identity and generation stored in the slot are preserved, so a
    /// tombstoned slot stays tombstoned.
    ///
    /// # Errors
    ///
    /// Returns a bounds error if `id` has no slot in this index.
    pub fn update_index(&mut self, id: EntryId, row: usize) -> Result<()> {
        let slot = id
            .slot()
            .filter(|slot| *slot < self.entries.len())
            .ok_or_else(|| self.out_of_bounds(id))?;

        let entry = &mut self.entries[slot];
        *entry = entry.at_row(row);
        Ok(())
    }

    /// Tombstones the given identities and queues them for reuse.
    ///
    /// Duplicates are ignored, as are identities that are already
    /// tombstoned.
    ///
    /// # Errors
    ///
    /// Returns a batch deletion error if no identities are given or if the
    /// batch would recycle the entire index, and a bounds error if any
    /// identity has no slot. Nothing is recycled on error.
    pub fn recycle_entries(&mut self, ids: &[EntryId]) -> Result<()> {
        let mut unique = ids.to_vec();
        unique.sort_unstable();
        unique.dedup();

        let count = unique.len();
        if count == 0 || count >= self.entries.len() {
            return Err(Error::batch_deletion(count, self.entries.len()));
        }
        if let Some(bad) = unique
            .iter()
            .find(|id| id.slot().is_none_or(|slot| slot >= self.entries.len()))
        {
            return Err(self.out_of_bounds(*bad));
        }

        for id in ids {
            let Some(slot) = id.slot() else { continue };
            let current = self.entries[slot];
            if !current.is_valid() {
                continue;
            }
            self.entries[slot] = Entry::new(EntryId::TOMBSTONE, current.recycled(), 0);
            self.recyclable.push_back(Entry::new(*id, current.recycled(), 0));
        }
        Ok(())
    }

    /// Wipes every entry, the recycle pool, and the identity counter.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.recyclable.clear();
        self.current = 0;
    }

    /// Looks up the entry for `id`.
    ///
    /// # Errors
    ///
    /// Returns a bounds error if `id` has no slot, or an invalid entry
    /// error if the slot is tombstoned.
    pub fn entry(&self, id: EntryId) -> Result<Entry> {
        let entry = id
            .slot()
            .and_then(|slot| self.entries.get(slot))
            .ok_or_else(|| self.out_of_bounds(id))?;

        if entry.is_valid() {
            Ok(*entry)
        } else {
            Err(Error::invalid_entry_access(id))
        }
    }

    /// Returns every slot, tombstones included, indexed by `identity - 1`.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Iterates over the recycle pool in reuse order.
    pub fn recyclable(&self) -> impl ExactSizeIterator<Item = &Entry> + '_ {
        self.recyclable.iter()
    }

    /// Returns the number of slots, tombstones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if no identity has been issued since the last reset.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of non-tombstoned slots.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.entries.len() - self.recyclable.len()
    }

    /// Bounds error for an identity without a slot, reported against the
    /// slot range `[0, len - 1]`.
    fn out_of_bounds(&self, id: EntryId) -> Error {
        Error::index_out_of_bounds(
            id.get().saturating_sub(1) as usize,
            self.entries.len().saturating_sub(1),
        )
    }
}

/// An entry index shared by reference between tables.
///
/// Rows can only be transferred between tables holding clones of the same
/// handle.
#[derive(Clone, Debug, Default)]
pub struct SharedEntryIndex(Rc<RefCell<EntryIndex>>);

impl SharedEntryIndex {
    /// Creates a handle to a fresh, empty entry index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrows the index.
    ///
    /// # Panics
    ///
    /// Panics if the index is currently borrowed mutably.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, EntryIndex> {
        self.0.borrow()
    }

    /// Borrows the index mutably.
    ///
    /// # Panics
    ///
    /// Panics if the index is currently borrowed.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, EntryIndex> {
        self.0.borrow_mut()
    }

    /// Returns true if both handles refer to the same index.
    #[must_use]
    pub fn ptr_eq(&self, other: &SharedEntryIndex) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl From<EntryIndex> for SharedEntryIndex {
    fn from(index: EntryIndex) -> Self {
        Self(Rc::new(RefCell::new(index)))
    }
}
