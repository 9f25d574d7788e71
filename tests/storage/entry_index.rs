//! Integration tests for the entry index
//!
//! Tests identity issuing, FIFO recycling, and index sharing between tables.

use densetable_foundation::{EntryId, ErrorKind, register_kind};
use densetable_storage::{EntryIndex, SharedEntryIndex, Table, TableOptions};

#[test]
fn recycled_identities_come_back_in_order() {
    let mut index = EntryIndex::new();
    let issued = index.new_entries(5).unwrap();
    let generation_of = |id: EntryId| issued[id.slot().unwrap()].recycled();

    index.recycle_entries(&[EntryId(2), EntryId(4)]).unwrap();
    let first = index.new_entries(1).unwrap()[0];
    let second = index.new_entries(1).unwrap()[0];

    assert_eq!(first.id(), EntryId(2));
    assert_eq!(first.recycled(), generation_of(EntryId(2)) + 1);
    assert_eq!(second.id(), EntryId(4));
    assert_eq!(second.recycled(), generation_of(EntryId(4)) + 1);
}

#[test]
fn recycling_the_whole_index_is_refused() {
    let mut index = EntryIndex::new();
    index.new_entries(3).unwrap();

    let err = index
        .recycle_entries(&[EntryId(1), EntryId(2), EntryId(3)])
        .unwrap_err();

    assert_eq!(
        err.kind,
        ErrorKind::BatchDeletion {
            count: 3,
            capacity: 3
        }
    );
    assert_eq!(index.live_count(), 3);
}

#[test]
fn tables_sharing_an_index_never_share_identities() {
    let index = SharedEntryIndex::new();
    let kind = register_kind::<u32>();
    let mut a = TableOptions::new(&[kind])
        .with_entry_index(index.clone())
        .build()
        .unwrap();
    let mut b = TableOptions::new(&[kind])
        .with_entry_index(index.clone())
        .build()
        .unwrap();

    a.new_entries(3).unwrap();
    b.new_entries(3).unwrap();

    for id in a.entry_ids() {
        assert!(!b.entry_ids().contains(id));
    }
    assert_eq!(index.borrow().len(), 6);
}

#[test]
fn index_rows_follow_swaps() {
    let mut table = Table::new(&[register_kind::<u8>()]).unwrap();
    table.new_entries(10).unwrap();
    table.delete_entries(&[0, 3, 9]).unwrap();

    let index = table.entry_index().borrow();
    for (row, id) in table.entry_ids().iter().enumerate() {
        assert_eq!(index.entry(*id).unwrap().row(), row);
    }
}

#[test]
fn deleted_identities_are_tombstoned() {
    let mut table = Table::new(&[register_kind::<u8>()]).unwrap();
    table.new_entries(4).unwrap();
    let removed = table.delete_entries(&[1]).unwrap();

    let err = table.entry_index().borrow().entry(removed[0]).unwrap_err();
    assert_eq!(err.kind, ErrorKind::InvalidEntryAccess(removed[0]));
}

#[test]
fn reset_starts_identities_over() {
    let mut index = EntryIndex::new();
    index.new_entries(4).unwrap();
    index.reset();

    assert!(index.is_empty());
    assert_eq!(index.new_entries(1).unwrap()[0].id(), EntryId(1));
}
