//! Typed handles for reading and writing one data kind across tables.
//!
//! An [`Accessor`] resolves its kind's slot through the table's schema on
//! every call. A [`LockedAccessor`] resolves the slot once against a schema
//! and reuses it, which is the hot-loop path for tables sharing that schema.

use std::any::type_name;
use std::marker::PhantomData;

use densetable_foundation::{DataKind, Error, Result};

use crate::schema::SharedSchema;
use crate::table::Table;

/// Typed access to one data kind in any table.
#[derive(Debug)]
pub struct Accessor<T> {
    kind: DataKind,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Accessor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Accessor<T> {}

impl<T: 'static> Accessor<T> {
    /// Creates an accessor for `kind`.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch error if `kind` does not store `T`.
    pub fn new(kind: DataKind) -> Result<Self> {
        if !kind.is::<T>() {
            return Err(Error::type_mismatch(kind, type_name::<T>()));
        }
        Ok(Self {
            kind,
            _marker: PhantomData,
        })
    }

    /// Returns the accessed kind.
    #[must_use]
    pub fn kind(&self) -> DataKind {
        self.kind
    }

    /// Returns true if `table` stores this accessor's kind.
    #[must_use]
    pub fn check(&self, table: &Table) -> bool {
        table.contains(self.kind)
    }

    /// Reads the value at `row`, or `None` if the table lacks the kind or
    /// the row.
    #[must_use]
    pub fn get<'t>(&self, row: usize, table: &'t Table) -> Option<&'t T> {
        let slot = table.slot_of(self.kind.id())?;
        table.store().get::<T>(slot, self.kind.id(), row)
    }

    /// Mutable counterpart of [`get`](Self::get).
    #[must_use]
    pub fn get_mut<'t>(&self, row: usize, table: &'t mut Table) -> Option<&'t mut T> {
        let slot = table.slot_of(self.kind.id())?;
        table.store_mut().get_mut::<T>(slot, self.kind.id(), row)
    }

    /// Pre-resolves this accessor's slot against `schema`.
    ///
    /// # Errors
    ///
    /// Returns a bounds error if `schema` has no slot for the kind.
    pub fn lock(&self, schema: &SharedSchema) -> Result<LockedAccessor<T>> {
        let resolver = schema.borrow();
        if !resolver.contains(self.kind.id()) {
            return Err(Error::index_out_of_bounds(
                self.kind.id().index(),
                resolver.registered(),
            ));
        }
        let slot = resolver.slot_for(self.kind.id())?;
        Ok(LockedAccessor {
            kind: self.kind,
            slot,
            schema_addr: schema.addr(),
            _marker: PhantomData,
        })
    }
}

/// Typed access to one data kind, with its slot resolved against one schema.
///
/// Only use a locked accessor with tables built on the schema it was locked
/// against. Debug builds assert this.
#[derive(Debug)]
pub struct LockedAccessor<T> {
    kind: DataKind,
    slot: usize,
    schema_addr: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for LockedAccessor<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for LockedAccessor<T> {}

impl<T: 'static> LockedAccessor<T> {
    /// Returns the accessed kind.
    #[must_use]
    pub fn kind(&self) -> DataKind {
        self.kind
    }

    /// Returns the pre-resolved slot.
    #[must_use]
    pub fn slot(&self) -> usize {
        self.slot
    }

    fn debug_check_schema(&self, table: &Table) {
        debug_assert_eq!(
            self.schema_addr,
            table.schema().addr(),
            "locked accessor for {} used with a table on another schema",
            self.kind
        );
    }

    /// Returns true if `table` stores this accessor's kind.
    #[must_use]
    pub fn check(&self, table: &Table) -> bool {
        self.debug_check_schema(table);
        table.mask().contains(self.slot)
    }

    /// Reads the value at `row`, or `None` if the table lacks the kind or
    /// the row.
    #[must_use]
    pub fn get<'t>(&self, row: usize, table: &'t Table) -> Option<&'t T> {
        self.debug_check_schema(table);
        table.store().get::<T>(self.slot, self.kind.id(), row)
    }

    /// Mutable counterpart of [`get`](Self::get).
    #[must_use]
    pub fn get_mut<'t>(&self, row: usize, table: &'t mut Table) -> Option<&'t mut T> {
        self.debug_check_schema(table);
        table.store_mut().get_mut::<T>(self.slot, self.kind.id(), row)
    }

    /// Reads the value at `row` without any checks.
    ///
    /// # Safety
    ///
    /// `table` must be built on the schema this accessor was locked against,
    /// must store this accessor's kind, and `row` must be less than
    /// `table.len()`.
    #[must_use]
    pub unsafe fn get_unchecked<'t>(&self, row: usize, table: &'t Table) -> &'t T {
        self.debug_check_schema(table);
        // SAFETY: guaranteed by the caller; the slot holds a column of `T`
        // because the kind stores `T` and the schema maps it to this slot.
        unsafe { table.store().get_unchecked::<T>(self.slot, row) }
    }

    /// Mutable counterpart of [`get_unchecked`](Self::get_unchecked).
    ///
    /// # Safety
    ///
    /// Same as [`get_unchecked`](Self::get_unchecked).
    #[must_use]
    pub unsafe fn get_unchecked_mut<'t>(&self, row: usize, table: &'t mut Table) -> &'t mut T {
        self.debug_check_schema(table);
        // SAFETY: as in `get_unchecked`.
        unsafe { table.store_mut().get_unchecked_mut::<T>(self.slot, row) }
    }
}
