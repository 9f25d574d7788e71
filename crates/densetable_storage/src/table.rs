//! Columnar tables of entries.
//!
//! A [`Table`] stores one [`Column`] per data kind, all of the same length.
//! Row `i` of every column belongs to the entry whose identity is
//! `entry_ids()[i]`. Deletion swaps doomed rows to the end and truncates, so
//! rows stay dense but their order is not stable.

use std::any::type_name;
use std::fmt;

use densetable_foundation::{
    CacheMode, Column, DataKind, DataKindId, Entry, EntryId, Error, ErrorKind, Mask, Result,
};

use crate::cache::CachedColumns;
use crate::entry_index::{EntryIndex, SharedEntryIndex};
use crate::events::TableEvents;
use crate::options::{TableOptions, TableParts};
use crate::schema::SharedSchema;

/// Dense, column-oriented storage for entries sharing one set of data kinds.
pub struct Table {
    schema: SharedSchema,
    entry_index: SharedEntryIndex,
    /// Kinds in construction order, without duplicates.
    kinds: Vec<DataKind>,
    store: CachedColumns,
    mask: Mask,
    /// Row to identity.
    entry_ids: Vec<EntryId>,
    capacity: usize,
    events: Option<Box<dyn TableEvents>>,
}

impl Table {
    /// Creates a table for `kinds` with default options.
    ///
    /// # Errors
    ///
    /// See [`TableOptions::build`].
    pub fn new(kinds: &[DataKind]) -> Result<Self> {
        TableOptions::new(kinds).build()
    }

    pub(crate) fn from_parts(parts: TableParts) -> Result<Self> {
        let TableParts {
            schema,
            entry_index,
            kinds: requested,
            events,
            cache_mode,
            auto_register,
        } = parts;

        let mut kinds: Vec<DataKind> = Vec::with_capacity(requested.len());
        for kind in requested {
            if !kinds.contains(&kind) {
                kinds.push(kind);
            }
        }
        if kinds.is_empty() {
            return Err(Error::new(ErrorKind::NoDataKinds));
        }

        if auto_register {
            schema.borrow_mut().register(&kinds);
        }

        let mut columns: Vec<Option<Column>> = Vec::new();
        let mut mask = Mask::new();
        {
            let resolver = schema.borrow();
            columns.resize_with(resolver.registered(), || None);
            for kind in &kinds {
                if !resolver.contains(kind.id()) {
                    return Err(Error::new(ErrorKind::UnregisteredKind(*kind)));
                }
                let slot = resolver.slot_for(kind.id())?;
                if slot >= Mask::CAPACITY {
                    return Err(Error::new(ErrorKind::MaskOverflow {
                        slot,
                        max: Mask::CAPACITY,
                    }));
                }
                if slot >= columns.len() {
                    columns.resize_with(slot + 1, || None);
                }
                columns[slot] = Some(Column::new(*kind));
                mask.mark(slot);
            }
        }

        tracing::debug!(?kinds, ?mask, ?cache_mode, "created table");

        Ok(Self {
            schema,
            entry_index,
            kinds,
            store: CachedColumns::new(cache_mode, columns),
            mask,
            entry_ids: Vec::new(),
            capacity: 0,
            events,
        })
    }

    // =========================================================================
    // Entry lifecycle
    // =========================================================================

    /// Appends `count` default-valued rows and issues an entry for each.
    ///
    /// Recycled identities are reused before new ones are minted. The
    /// returned entries carry their final rows.
    ///
    /// # Errors
    ///
    /// Returns a batch operation error if `count` is zero, or the hook's
    /// error if `before_entries_created` vetoes. Nothing changes on error.
    pub fn new_entries(&mut self, count: usize) -> Result<Vec<Entry>> {
        if count == 0 {
            return Err(Error::batch_operation(count));
        }
        if let Some(events) = self.events.as_mut() {
            events.before_entries_created(count)?;
        }

        let entries = self.allocate_entries(count)?;

        if let Some(events) = self.events.as_mut() {
            events.after_entries_created(&entries);
        }
        tracing::trace!(count, len = self.len(), "created entries");
        Ok(entries)
    }

    /// Removes the given rows and recycles their identities.
    ///
    /// Duplicate rows are ignored. Each removed row is filled by a row from
    /// the end of the table, so surviving rows may move.
    ///
    /// The entry index never recycles every identity it holds. If this
    /// deletion would do so, for example deleting every row of the only
    /// table on an index, the removed identities stay live in the index and
    /// keep resolving to their last recorded rows.
    ///
    /// # Errors
    ///
    /// Returns a batch error if no rows are given or more unique rows than
    /// the table holds, a bounds error if any row is `>= len()`, or the
    /// hook's error if `before_entries_deleted` vetoes. Nothing changes on
    /// error.
    pub fn delete_entries(&mut self, rows: &[usize]) -> Result<Vec<EntryId>> {
        let rows = self.validate_rows(rows)?;
        if let Some(events) = self.events.as_mut() {
            events.before_entries_deleted(&rows)?;
        }

        let removed = self.remove_rows(&rows)?;
        self.recycle(&removed);

        if let Some(events) = self.events.as_mut() {
            events.after_entries_deleted(&removed);
        }
        tracing::trace!(count = removed.len(), len = self.len(), "deleted entries");
        Ok(removed)
    }

    /// Moves the given rows into `target`, carrying over the value of every
    /// kind both tables store.
    ///
    /// The moved rows are appended to `target` in ascending source-row
    /// order and receive fresh entries from the shared index. If the tables
    /// share no kinds, this is a delete from `self` followed by a create in
    /// `target`, and both tables' hooks run. Otherwise only `target`'s
    /// creation hooks run.
    ///
    /// # Errors
    ///
    /// Returns a transfer error if the tables do not share an entry index,
    /// the same row errors as [`delete_entries`](Self::delete_entries), or
    /// the error of any vetoing before-hook. Nothing changes on error.
    pub fn transfer_entries(&mut self, target: &mut Table, rows: &[usize]) -> Result<Vec<Entry>> {
        if !self.entry_index.ptr_eq(&target.entry_index) {
            return Err(Error::new(ErrorKind::TransferIndexMismatch));
        }
        let rows = self.validate_rows(rows)?;
        let count = rows.len();

        let shared: Vec<(usize, usize)> = target
            .kinds
            .iter()
            .filter_map(|kind| Some((self.slot_of(kind.id())?, target.slot_of(kind.id())?)))
            .collect();

        if shared.is_empty() {
            return self.replace_entries(target, &rows);
        }

        if let Some(events) = target.events.as_mut() {
            events.before_entries_created(count)?;
        }

        let moved: Vec<EntryId> = rows.iter().map(|row| self.entry_ids[*row]).collect();
        self.recycle(&moved);

        let prior = target.len();
        let entries = target.allocate_entries(count)?;
        {
            let mut columns = target.store.edit();
            for &(from, to) in &shared {
                let (Some(source), Some(dest)) = (self.store.column(from), columns[to].as_mut())
                else {
                    continue;
                };
                for (offset, row) in rows.iter().enumerate() {
                    source.copy_row_into(*row, dest, prior + offset)?;
                }
            }
        }

        self.remove_rows(&rows)?;

        // Removing rows from the source re-points every identity it swaps,
        // including recycled ones the target now owns.
        {
            let mut index = target.entry_index.borrow_mut();
            for entry in &entries {
                index.update_index(entry.id(), entry.row())?;
            }
        }

        if let Some(events) = target.events.as_mut() {
            events.after_entries_created(&entries);
        }
        tracing::trace!(
            count,
            shared = shared.len(),
            source_len = self.len(),
            target_len = target.len(),
            "transferred entries"
        );
        Ok(entries)
    }

    /// Deletes `rows` from `self` and creates as many entries in `target`.
    /// Both tables' before-hooks run ahead of any change.
    fn replace_entries(&mut self, target: &mut Table, rows: &[usize]) -> Result<Vec<Entry>> {
        let count = rows.len();
        if let Some(events) = target.events.as_mut() {
            events.before_entries_created(count)?;
        }
        if let Some(events) = self.events.as_mut() {
            events.before_entries_deleted(rows)?;
        }

        let removed = self.remove_rows(rows)?;
        self.recycle(&removed);
        let entries = target.allocate_entries(count)?;

        if let Some(events) = self.events.as_mut() {
            events.after_entries_deleted(&removed);
        }
        if let Some(events) = target.events.as_mut() {
            events.after_entries_created(&entries);
        }
        tracing::trace!(
            count,
            source_len = self.len(),
            target_len = target.len(),
            "replaced entries across tables"
        );
        Ok(entries)
    }

    /// Removes every row and recycles every identity.
    ///
    /// Columns keep their allocations; the table's capacity drops to zero.
    /// As with [`delete_entries`](Self::delete_entries), identities stay
    /// live in the index when they are all the index holds.
    pub fn clear(&mut self) {
        let ids: Vec<EntryId> = self.entry_ids.drain(..).collect();
        {
            let mut columns = self.store.edit();
            for column in columns.owned() {
                column.resize(0);
            }
        }
        self.capacity = 0;
        if !ids.is_empty() {
            self.recycle(&ids);
        }
        tracing::trace!(count = ids.len(), "cleared table");
    }

    /// Issues `count` entries, appends rows for them, and records their rows
    /// in the entry index. Runs no hooks.
    fn allocate_entries(&mut self, count: usize) -> Result<Vec<Entry>> {
        let issued = self.entry_index.borrow_mut().new_entries(count)?;
        let prior = self.len();
        let required = prior + count;

        let grown = (required > self.capacity).then(|| required.max(self.capacity * 6 / 5));
        {
            let mut columns = self.store.edit();
            for column in columns.owned() {
                if let Some(capacity) = grown {
                    column.reserve_total(capacity);
                }
                column.resize(required);
            }
        }
        if let Some(capacity) = grown {
            tracing::debug!(from = self.capacity, to = capacity, "grew table capacity");
            self.capacity = capacity;
        }

        let mut index = self.entry_index.borrow_mut();
        let mut entries = Vec::with_capacity(count);
        for (offset, entry) in issued.into_iter().enumerate() {
            let row = prior + offset;
            index.update_index(entry.id(), row)?;
            self.entry_ids.push(entry.id());
            entries.push(entry.at_row(row));
        }
        Ok(entries)
    }

    /// Sorts and deduplicates `rows` and checks them against the length.
    fn validate_rows(&self, rows: &[usize]) -> Result<Vec<usize>> {
        let mut unique = rows.to_vec();
        unique.sort_unstable();
        unique.dedup();

        let len = self.len();
        if unique.is_empty() {
            return Err(Error::batch_operation(0));
        }
        if unique.len() > len {
            return Err(Error::batch_deletion(unique.len(), len));
        }
        if let Some(&row) = unique.last().filter(|row| **row >= len) {
            return Err(Error::index_out_of_bounds(row, len));
        }
        Ok(unique)
    }

    /// Swaps `rows` (sorted, unique, in bounds) to the end and truncates.
    /// Returns the removed identities without recycling them.
    fn remove_rows(&mut self, rows: &[usize]) -> Result<Vec<EntryId>> {
        let len = self.len();
        let remaining = len - rows.len();
        let shrink = self.capacity * 5 > remaining * 6;
        {
            let mut columns = self.store.edit();
            let mut index = self.entry_index.borrow_mut();
            for (k, &row) in rows.iter().rev().enumerate() {
                let end = len - 1 - k;
                if row < end {
                    swap_rows(&mut columns, &mut self.entry_ids, &mut index, row, end)?;
                }
            }
            for column in columns.owned() {
                column.resize(remaining);
                if shrink {
                    column.shrink_to(remaining);
                }
            }
        }
        if shrink {
            tracing::debug!(from = self.capacity, to = remaining, "shrank table capacity");
            self.capacity = remaining;
        }
        Ok(self.entry_ids.split_off(remaining))
    }

    /// Returns identities to the shared index. The index refuses to recycle
    /// every identity it holds; those stay allocated.
    fn recycle(&self, ids: &[EntryId]) {
        if let Err(error) = self.entry_index.borrow_mut().recycle_entries(ids) {
            tracing::debug!(%error, count = ids.len(), "entry index kept identities");
        }
    }

    // =========================================================================
    // Access
    // =========================================================================

    /// Returns the entry stored at `row`.
    ///
    /// # Errors
    ///
    /// Returns a bounds error if `row >= len()`, or the index's error if the
    /// identity at `row` is not live.
    pub fn entry(&self, row: usize) -> Result<Entry> {
        let id = self
            .entry_ids
            .get(row)
            .ok_or_else(|| Error::index_out_of_bounds(row, self.len()))?;
        self.entry_index.borrow().entry(*id)
    }

    /// Returns the column storing `kind`.
    ///
    /// # Errors
    ///
    /// Returns an invalid kind error if the table does not store `kind`.
    pub fn row(&self, kind: DataKind) -> Result<&Column> {
        self.slot_of(kind.id())
            .and_then(|slot| self.store.column(slot))
            .ok_or_else(|| Error::invalid_kind_access(kind, self.kinds.clone()))
    }

    /// Returns the value of `kind` at `row`.
    ///
    /// # Errors
    ///
    /// Returns an invalid kind error if the table does not store `kind`, a
    /// type mismatch if `T` is not `kind`'s type, or a bounds error.
    pub fn get<T: 'static>(&self, kind: DataKind, row: usize) -> Result<&T> {
        let slot = self.typed_slot::<T>(kind, row)?;
        self.store
            .get::<T>(slot, kind.id(), row)
            .ok_or_else(|| Error::index_out_of_bounds(row, self.len()))
    }

    /// Returns the value of `kind` at `row` mutably.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn get_mut<T: 'static>(&mut self, kind: DataKind, row: usize) -> Result<&mut T> {
        let slot = self.typed_slot::<T>(kind, row)?;
        let len = self.len();
        self.store
            .get_mut::<T>(slot, kind.id(), row)
            .ok_or_else(|| Error::index_out_of_bounds(row, len))
    }

    /// Writes `value` as `kind` at `row`.
    ///
    /// # Errors
    ///
    /// Same as [`get`](Self::get).
    pub fn set<T: 'static>(&mut self, kind: DataKind, value: T, row: usize) -> Result<()> {
        let slot = self.typed_slot::<T>(kind, row)?;
        let len = self.len();
        let mut column = self
            .store
            .edit_slot(slot)
            .ok_or_else(|| Error::invalid_kind_access(kind, self.kinds.clone()))?;
        let cell = column
            .as_mut_slice::<T>()
            .and_then(|values| values.get_mut(row))
            .ok_or_else(|| Error::index_out_of_bounds(row, len))?;
        *cell = value;
        Ok(())
    }

    fn typed_slot<T: 'static>(&self, kind: DataKind, row: usize) -> Result<usize> {
        let slot = self
            .slot_of(kind.id())
            .ok_or_else(|| Error::invalid_kind_access(kind, self.kinds.clone()))?;
        if !kind.is::<T>() {
            return Err(Error::type_mismatch(kind, type_name::<T>()));
        }
        if row >= self.len() {
            return Err(Error::index_out_of_bounds(row, self.len()));
        }
        Ok(slot)
    }

    /// Resolves the slot of `kind` if this table stores it.
    pub(crate) fn slot_of(&self, kind: DataKindId) -> Option<usize> {
        let schema = self.schema.borrow();
        if !schema.contains(kind) {
            return None;
        }
        schema
            .slot_for(kind)
            .ok()
            .filter(|slot| self.mask.contains(*slot))
    }

    pub(crate) fn store(&self) -> &CachedColumns {
        &self.store
    }

    pub(crate) fn store_mut(&mut self) -> &mut CachedColumns {
        &mut self.store
    }

    // =========================================================================
    // Containment
    // =========================================================================

    /// Returns true if the table stores `kind`.
    #[must_use]
    pub fn contains(&self, kind: DataKind) -> bool {
        self.slot_of(kind.id()).is_some()
    }

    /// Returns true if the table stores every kind in `kinds`.
    #[must_use]
    pub fn contains_all(&self, kinds: &[DataKind]) -> bool {
        let (query, storable) = self.query_mask(kinds);
        storable && self.mask.contains_all(&query)
    }

    /// Returns true if the table stores at least one kind in `kinds`.
    #[must_use]
    pub fn contains_any(&self, kinds: &[DataKind]) -> bool {
        self.mask.contains_any(&self.query_mask(kinds).0)
    }

    /// Returns true if the table stores none of `kinds`.
    #[must_use]
    pub fn contains_none(&self, kinds: &[DataKind]) -> bool {
        self.mask.contains_none(&self.query_mask(kinds).0)
    }

    /// Builds a mask from the slots of `kinds`. The flag is false if any
    /// kind is unknown to the schema or has a slot past the mask, since no
    /// table can store such a kind.
    fn query_mask(&self, kinds: &[DataKind]) -> (Mask, bool) {
        let schema = self.schema.borrow();
        let mut mask = Mask::new();
        let mut storable = true;
        for kind in kinds {
            if !schema.contains(kind.id()) {
                storable = false;
                continue;
            }
            match schema.slot_for(kind.id()) {
                Ok(slot) if slot < Mask::CAPACITY => mask.mark(slot),
                _ => storable = false,
            }
        }
        (mask, storable)
    }

    // =========================================================================
    // Properties
    // =========================================================================

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entry_ids.len()
    }

    /// Returns true if the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entry_ids.is_empty()
    }

    /// Returns the number of rows every column has room for.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of kinds (columns) the table stores.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.kinds.len()
    }

    /// Returns the kinds the table stores, in construction order.
    #[must_use]
    pub fn kinds(&self) -> &[DataKind] {
        &self.kinds
    }

    /// Iterates over the columns in slot order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.store.iter().map(|(_, column)| column)
    }

    /// Returns the identity at every row.
    #[must_use]
    pub fn entry_ids(&self) -> &[EntryId] {
        &self.entry_ids
    }

    /// Returns the slots this table occupies.
    #[must_use]
    pub fn mask(&self) -> &Mask {
        &self.mask
    }

    /// Returns the cache strategy chosen at construction.
    #[must_use]
    pub fn cache_mode(&self) -> CacheMode {
        self.store.mode()
    }

    /// Returns the schema this table resolves slots through.
    #[must_use]
    pub fn schema(&self) -> &SharedSchema {
        &self.schema
    }

    /// Returns the entry index this table issues identities from.
    #[must_use]
    pub fn entry_index(&self) -> &SharedEntryIndex {
        &self.entry_index
    }
}

/// Swaps rows `a` and `b` in every column and in the identity list, then
/// records both new positions in the index.
fn swap_rows(
    columns: &mut [Option<Column>],
    entry_ids: &mut [EntryId],
    index: &mut EntryIndex,
    a: usize,
    b: usize,
) -> Result<()> {
    for column in columns.iter_mut().flatten() {
        column.swap(a, b);
    }
    entry_ids.swap(a, b);
    index.update_index(entry_ids[a], a)?;
    index.update_index(entry_ids[b], b)
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("kinds", &self.kinds)
            .field("len", &self.len())
            .field("capacity", &self.capacity)
            .field("mask", &self.mask)
            .field("cache_mode", &self.cache_mode())
            .field("events", &self.events.is_some())
            .finish_non_exhaustive()
    }
}
