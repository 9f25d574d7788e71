//! Type-erased, densely packed columns.
//!
//! A [`Column`] stores the values of one [`DataKind`] for every row of a
//! table. The concrete storage is a `Vec<T>` behind a trait object, so a
//! table can hold columns of different types side by side and still move
//! rows between them without knowing `T`.

use std::any::Any;
use std::fmt;
use std::ptr::NonNull;

use crate::error::{Error, Result};
use crate::kind::DataKind;

/// Operations a table needs from a column without knowing its element type.
pub(crate) trait ColumnData {
    fn len(&self) -> usize;
    fn capacity(&self) -> usize;
    fn resize(&mut self, len: usize);
    fn reserve_total(&mut self, capacity: usize);
    fn shrink_to(&mut self, capacity: usize);
    fn swap(&mut self, a: usize, b: usize);
    /// Clones `row` into `target[target_row]`. Returns false if `target`
    /// stores a different element type.
    fn copy_row_into(&self, row: usize, target: &mut dyn ColumnData, target_row: usize) -> bool;
    fn as_mut_ptr(&mut self) -> NonNull<u8>;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Clone + Default + 'static> ColumnData for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn capacity(&self) -> usize {
        Vec::capacity(self)
    }

    fn resize(&mut self, len: usize) {
        Vec::resize_with(self, len, T::default);
    }

    fn reserve_total(&mut self, capacity: usize) {
        if capacity > Vec::capacity(self) {
            self.reserve_exact(capacity - Vec::len(self));
        }
    }

    fn shrink_to(&mut self, capacity: usize) {
        Vec::shrink_to(self, capacity);
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.as_mut_slice().swap(a, b);
    }

    fn copy_row_into(&self, row: usize, target: &mut dyn ColumnData, target_row: usize) -> bool {
        let Some(target) = target.as_any_mut().downcast_mut::<Vec<T>>() else {
            return false;
        };
        target[target_row] = self[row].clone();
        true
    }

    fn as_mut_ptr(&mut self) -> NonNull<u8> {
        // Vec never hands out a null pointer, even before allocating.
        NonNull::new(Vec::as_mut_ptr(self))
            .unwrap_or_else(NonNull::dangling)
            .cast()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

pub(crate) fn typed_column<T: Clone + Default + 'static>() -> Box<dyn ColumnData> {
    Box::new(Vec::<T>::new())
}

/// Growable storage for a single data kind, addressed by row.
pub struct Column {
    kind: DataKind,
    data: Box<dyn ColumnData>,
}

impl Column {
    /// Creates an empty column for `kind`.
    #[must_use]
    pub fn new(kind: DataKind) -> Self {
        Self {
            kind,
            data: kind.new_column_data(),
        }
    }

    /// Returns the kind stored in this column.
    #[must_use]
    pub fn kind(&self) -> DataKind {
        self.kind
    }

    /// Returns the number of live rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the column has no live rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.len() == 0
    }

    /// Returns the allocated capacity in rows.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    /// Sets the live length, filling new rows with `T::default()`.
    pub fn resize(&mut self, len: usize) {
        self.data.resize(len);
    }

    /// Grows the allocation so it holds at least `capacity` rows in total.
    pub fn reserve_total(&mut self, capacity: usize) {
        self.data.reserve_total(capacity);
    }

    /// Releases allocation beyond `capacity` rows (never below `len`).
    pub fn shrink_to(&mut self, capacity: usize) {
        self.data.shrink_to(capacity);
    }

    /// Swaps two rows.
    ///
    /// # Panics
    ///
    /// Panics if either row is out of bounds.
    pub fn swap(&mut self, a: usize, b: usize) {
        self.data.swap(a, b);
    }

    /// Clones the value at `row` into `target` at `target_row`.
    ///
    /// # Errors
    ///
    /// Returns a type mismatch error if the columns store different types.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `target_row` is out of bounds.
    pub fn copy_row_into(&self, row: usize, target: &mut Column, target_row: usize) -> Result<()> {
        if self.data.copy_row_into(row, target.data.as_mut(), target_row) {
            Ok(())
        } else {
            Err(Error::type_mismatch(target.kind, self.kind.type_name()))
        }
    }

    /// Returns the column as a typed slice, or `None` if `T` is not the
    /// stored type.
    #[must_use]
    pub fn as_slice<T: 'static>(&self) -> Option<&[T]> {
        self.data
            .as_any()
            .downcast_ref::<Vec<T>>()
            .map(Vec::as_slice)
    }

    /// Returns the column as a mutable typed slice, or `None` if `T` is not
    /// the stored type.
    #[must_use]
    pub fn as_mut_slice<T: 'static>(&mut self) -> Option<&mut [T]> {
        self.data
            .as_any_mut()
            .downcast_mut::<Vec<T>>()
            .map(Vec::as_mut_slice)
    }

    /// Returns the base address of the backing storage.
    ///
    /// The pointer is valid for `len()` elements of the stored type until
    /// the column is next resized, reserved, or shrunk.
    #[must_use]
    pub fn base_ptr(&mut self) -> NonNull<u8> {
        self.data.as_mut_ptr()
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("kind", &self.kind)
            .field("len", &self.len())
            .field("capacity", &self.capacity())
            .finish()
    }
}
