//! Column cache: O(1) typed access to a table's columns.
//!
//! A table keeps one cache slot per schema slot. In [`CacheMode::Safe`] a
//! slot records which kind lives there and typed access goes through the
//! column's checked downcast. In [`CacheMode::Fast`] a slot records the raw
//! base address of the column's storage, and typed access is a single
//! pointer offset.
//!
//! Raw base addresses dangle as soon as a column reallocates, so columns are
//! only reachable mutably through [`CachedColumns::edit`] and
//! [`CachedColumns::edit_slot`]. Both return guards that refresh the cache
//! when dropped, which keeps every cached address in step with its column.

use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

use densetable_foundation::{CacheMode, Column, DataKindId};

#[derive(Copy, Clone, Debug)]
struct SafeHandle {
    kind: DataKindId,
    len: usize,
}

#[derive(Copy, Clone, Debug)]
struct RawHandle {
    kind: DataKindId,
    base: NonNull<u8>,
    len: usize,
    footprint: usize,
}

#[derive(Debug)]
enum ColumnCache {
    Safe(Vec<Option<SafeHandle>>),
    Fast(Vec<Option<RawHandle>>),
}

impl ColumnCache {
    fn new(mode: CacheMode, slots: usize) -> Self {
        match mode {
            CacheMode::Safe => Self::Safe(vec![None; slots]),
            CacheMode::Fast => Self::Fast(vec![None; slots]),
        }
    }

    fn mode(&self) -> CacheMode {
        match self {
            Self::Safe(_) => CacheMode::Safe,
            Self::Fast(_) => CacheMode::Fast,
        }
    }

    fn refresh(&mut self, slot: usize, column: Option<&mut Column>) {
        match self {
            Self::Safe(handles) => {
                handles[slot] = column.map(|column| SafeHandle {
                    kind: column.kind().id(),
                    len: column.len(),
                });
            }
            Self::Fast(handles) => {
                handles[slot] = column.map(|column| RawHandle {
                    kind: column.kind().id(),
                    len: column.len(),
                    footprint: column.kind().footprint() as usize,
                    base: column.base_ptr(),
                });
            }
        }
    }
}

/// A table's columns, indexed by schema slot, together with their cache.
#[derive(Debug)]
pub(crate) struct CachedColumns {
    columns: Vec<Option<Column>>,
    cache: ColumnCache,
}

impl CachedColumns {
    /// Wraps `columns` and builds the cache for them.
    pub(crate) fn new(mode: CacheMode, columns: Vec<Option<Column>>) -> Self {
        let mut store = Self {
            cache: ColumnCache::new(mode, columns.len()),
            columns,
        };
        store.rebuild();
        store
    }

    pub(crate) fn mode(&self) -> CacheMode {
        self.cache.mode()
    }

    pub(crate) fn column(&self, slot: usize) -> Option<&Column> {
        self.columns.get(slot).and_then(Option::as_ref)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &Column)> + '_ {
        self.columns
            .iter()
            .enumerate()
            .filter_map(|(slot, column)| column.as_ref().map(|column| (slot, column)))
    }

    /// Grants mutable access to every column; the whole cache is rebuilt
    /// when the guard drops.
    pub(crate) fn edit(&mut self) -> ColumnsMut<'_> {
        ColumnsMut { store: self }
    }

    /// Grants mutable access to one column; only its cache slot is
    /// refreshed when the guard drops.
    pub(crate) fn edit_slot(&mut self, slot: usize) -> Option<SlotMut<'_>> {
        self.columns.get(slot)?.as_ref()?;
        Some(SlotMut { store: self, slot })
    }

    fn rebuild(&mut self) {
        for (slot, column) in self.columns.iter_mut().enumerate() {
            self.cache.refresh(slot, column.as_mut());
        }
        tracing::trace!(slots = self.columns.len(), mode = ?self.cache.mode(), "rebuilt column cache");
    }

    /// Typed read through the cache.
    ///
    /// Returns `None` if the slot is empty, holds a different kind, or `row`
    /// is past the column's length. The caller guarantees that `kind` stores
    /// values of type `T`.
    pub(crate) fn get<T: 'static>(&self, slot: usize, kind: DataKindId, row: usize) -> Option<&T> {
        match &self.cache {
            ColumnCache::Safe(handles) => {
                let handle = handles.get(slot).copied().flatten()?;
                if handle.kind != kind {
                    return None;
                }
                let column = self.column(slot)?;
                debug_assert_eq!(handle.len, column.len(), "stale column cache");
                column.as_slice::<T>()?.get(row)
            }
            ColumnCache::Fast(handles) => {
                let handle = handles.get(slot).copied().flatten()?;
                if handle.kind != kind || row >= handle.len {
                    return None;
                }
                // SAFETY: the handle was refreshed after the last change to
                // this column's storage, so `base` addresses `len` live
                // elements of `kind`'s type, which the caller guarantees is
                // `T`. `&self` keeps the columns from changing while the
                // reference is alive.
                Some(unsafe { &*handle.base.as_ptr().add(row * handle.footprint).cast::<T>() })
            }
        }
    }

    /// Typed write access through the cache. Same contract as
    /// [`get`](Self::get).
    pub(crate) fn get_mut<T: 'static>(
        &mut self,
        slot: usize,
        kind: DataKindId,
        row: usize,
    ) -> Option<&mut T> {
        match &self.cache {
            ColumnCache::Safe(handles) => {
                let handle = handles.get(slot).copied().flatten()?;
                if handle.kind != kind {
                    return None;
                }
                let column = self.columns.get_mut(slot)?.as_mut()?;
                debug_assert_eq!(handle.len, column.len(), "stale column cache");
                column.as_mut_slice::<T>()?.get_mut(row)
            }
            ColumnCache::Fast(handles) => {
                let handle = handles.get(slot).copied().flatten()?;
                if handle.kind != kind || row >= handle.len {
                    return None;
                }
                // SAFETY: as in `get`; `&mut self` makes the reference
                // exclusive.
                Some(unsafe { &mut *handle.base.as_ptr().add(row * handle.footprint).cast::<T>() })
            }
        }
    }

    /// Typed read without slot, kind, or bounds checks.
    ///
    /// # Safety
    ///
    /// `slot` must hold a column of type `T` and `row` must be less than
    /// its length.
    pub(crate) unsafe fn get_unchecked<T: 'static>(&self, slot: usize, row: usize) -> &T {
        // SAFETY: guaranteed by the caller.
        unsafe {
            match &self.cache {
                ColumnCache::Safe(_) => self
                    .columns
                    .get_unchecked(slot)
                    .as_ref()
                    .unwrap_unchecked()
                    .as_slice::<T>()
                    .unwrap_unchecked()
                    .get_unchecked(row),
                ColumnCache::Fast(handles) => {
                    let handle = handles.get_unchecked(slot).unwrap_unchecked();
                    &*handle.base.as_ptr().add(row * handle.footprint).cast::<T>()
                }
            }
        }
    }

    /// Typed write access without slot, kind, or bounds checks.
    ///
    /// # Safety
    ///
    /// Same as [`get_unchecked`](Self::get_unchecked).
    pub(crate) unsafe fn get_unchecked_mut<T: 'static>(&mut self, slot: usize, row: usize) -> &mut T {
        // SAFETY: guaranteed by the caller.
        unsafe {
            match &self.cache {
                ColumnCache::Safe(_) => self
                    .columns
                    .get_unchecked_mut(slot)
                    .as_mut()
                    .unwrap_unchecked()
                    .as_mut_slice::<T>()
                    .unwrap_unchecked()
                    .get_unchecked_mut(row),
                ColumnCache::Fast(handles) => {
                    let handle = handles.get_unchecked(slot).unwrap_unchecked();
                    &mut *handle.base.as_ptr().add(row * handle.footprint).cast::<T>()
                }
            }
        }
    }
}

/// Mutable view of every column. Rebuilds the cache on drop.
pub(crate) struct ColumnsMut<'a> {
    store: &'a mut CachedColumns,
}

impl ColumnsMut<'_> {
    /// Iterates over the columns the table owns.
    pub(crate) fn owned(&mut self) -> impl Iterator<Item = &mut Column> + '_ {
        self.store.columns.iter_mut().flatten()
    }
}

impl Deref for ColumnsMut<'_> {
    type Target = [Option<Column>];

    fn deref(&self) -> &Self::Target {
        &self.store.columns
    }
}

impl DerefMut for ColumnsMut<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.store.columns
    }
}

impl Drop for ColumnsMut<'_> {
    fn drop(&mut self) {
        self.store.rebuild();
    }
}

/// Mutable view of one column. Refreshes its cache slot on drop.
pub(crate) struct SlotMut<'a> {
    store: &'a mut CachedColumns,
    slot: usize,
}

impl Deref for SlotMut<'_> {
    type Target = Column;

    fn deref(&self) -> &Column {
        self.store.columns[self.slot]
            .as_ref()
            .expect("slot guard created for an empty slot")
    }
}

impl DerefMut for SlotMut<'_> {
    fn deref_mut(&mut self) -> &mut Column {
        self.store.columns[self.slot]
            .as_mut()
            .expect("slot guard created for an empty slot")
    }
}

impl Drop for SlotMut<'_> {
    fn drop(&mut self) {
        let column = self.store.columns[self.slot].as_mut();
        self.store.cache.refresh(self.slot, column);
    }
}
