//! Lifecycle hooks around entry creation and deletion.

use densetable_foundation::{Entry, EntryId, Result};

/// Hooks a table calls around entry creation and deletion.
///
/// Every method has a no-op default. Returning an error from a `before_`
/// hook vetoes the operation; the table is left untouched.
pub trait TableEvents {
    /// Called before `count` entries are created.
    ///
    /// # Errors
    ///
    /// Any error vetoes the creation.
    fn before_entries_created(&mut self, _count: usize) -> Result<()> {
        Ok(())
    }

    /// Called after entries were created, with their final rows.
    fn after_entries_created(&mut self, _entries: &[Entry]) {}

    /// Called before the given rows are deleted.
    ///
    /// # Errors
    ///
    /// Any error vetoes the deletion.
    fn before_entries_deleted(&mut self, _rows: &[usize]) -> Result<()> {
        Ok(())
    }

    /// Called after entries were deleted, with their identities.
    fn after_entries_deleted(&mut self, _ids: &[EntryId]) {}
}
