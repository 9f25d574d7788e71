//! Integration tests for lifecycle hooks
//!
//! Tests hook ordering, vetoes, and which hooks a transfer fires.

use std::cell::RefCell;
use std::rc::Rc;

use densetable_foundation::{Entry, EntryId, Error, ErrorKind, Result, register_kind};
use densetable_storage::{SharedEntryIndex, SharedSchema, TableEvents, TableOptions};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    BeforeCreate(usize),
    AfterCreate(Vec<usize>),
    BeforeDelete(Vec<usize>),
    AfterDelete(usize),
}

#[derive(Clone, Default)]
struct Recorder {
    log: Rc<RefCell<Vec<Event>>>,
    refuse_create: bool,
    refuse_delete: bool,
}

impl Recorder {
    fn events(&self) -> Vec<Event> {
        self.log.borrow().clone()
    }
}

impl TableEvents for Recorder {
    fn before_entries_created(&mut self, count: usize) -> Result<()> {
        self.log.borrow_mut().push(Event::BeforeCreate(count));
        if self.refuse_create {
            return Err(Error::vetoed("creation disabled"));
        }
        Ok(())
    }

    fn after_entries_created(&mut self, entries: &[Entry]) {
        let rows = entries.iter().map(Entry::row).collect();
        self.log.borrow_mut().push(Event::AfterCreate(rows));
    }

    fn before_entries_deleted(&mut self, rows: &[usize]) -> Result<()> {
        self.log.borrow_mut().push(Event::BeforeDelete(rows.to_vec()));
        if self.refuse_delete {
            return Err(Error::vetoed("deletion disabled"));
        }
        Ok(())
    }

    fn after_entries_deleted(&mut self, ids: &[EntryId]) {
        self.log.borrow_mut().push(Event::AfterDelete(ids.len()));
    }
}

#[test]
fn hooks_surround_creation_and_deletion() {
    let recorder = Recorder::default();
    let mut table = TableOptions::new(&[register_kind::<u8>()])
        .with_events(recorder.clone())
        .build()
        .unwrap();

    table.new_entries(3).unwrap();
    table.delete_entries(&[2, 0, 2]).unwrap();

    assert_eq!(
        recorder.events(),
        vec![
            Event::BeforeCreate(3),
            Event::AfterCreate(vec![0, 1, 2]),
            Event::BeforeDelete(vec![0, 2]),
            Event::AfterDelete(2),
        ]
    );
}

#[test]
fn vetoed_creation_changes_nothing() {
    let recorder = Recorder {
        refuse_create: true,
        ..Recorder::default()
    };
    let mut table = TableOptions::new(&[register_kind::<u8>()])
        .with_events(recorder.clone())
        .build()
        .unwrap();

    let err = table.new_entries(4).unwrap_err();

    assert!(matches!(err.kind, ErrorKind::Vetoed(_)));
    assert!(table.is_empty());
    assert!(table.entry_index().borrow().is_empty());
    assert_eq!(recorder.events(), vec![Event::BeforeCreate(4)]);
}

#[test]
fn vetoed_deletion_changes_nothing() {
    let recorder = Recorder {
        refuse_delete: true,
        ..Recorder::default()
    };
    let mut table = TableOptions::new(&[register_kind::<u8>()])
        .with_events(recorder.clone())
        .build()
        .unwrap();
    table.new_entries(3).unwrap();
    let ids = table.entry_ids().to_vec();

    assert!(table.delete_entries(&[1]).is_err());
    assert_eq!(table.entry_ids(), ids.as_slice());
}

#[test]
fn invalid_rows_never_reach_hooks() {
    let recorder = Recorder::default();
    let mut table = TableOptions::new(&[register_kind::<u8>()])
        .with_events(recorder.clone())
        .build()
        .unwrap();
    table.new_entries(2).unwrap();

    assert!(table.delete_entries(&[7]).is_err());
    assert_eq!(recorder.events().len(), 2);
}

#[test]
fn transfer_fires_only_target_creation_hooks() {
    let kind = register_kind::<u32>();
    let schema = SharedSchema::compact();
    let index = SharedEntryIndex::new();
    let source_log = Recorder::default();
    let target_log = Recorder::default();
    let mut source = TableOptions::new(&[kind])
        .with_schema(schema.clone())
        .with_entry_index(index.clone())
        .with_events(source_log.clone())
        .build()
        .unwrap();
    let mut target = TableOptions::new(&[kind])
        .with_schema(schema)
        .with_entry_index(index)
        .with_events(target_log.clone())
        .build()
        .unwrap();
    source.new_entries(4).unwrap();

    source.transfer_entries(&mut target, &[1, 3]).unwrap();

    assert_eq!(source_log.events().len(), 2);
    assert_eq!(
        target_log.events(),
        vec![Event::BeforeCreate(2), Event::AfterCreate(vec![0, 1])]
    );
}

#[test]
fn target_veto_blocks_transfer() {
    let kind = register_kind::<u32>();
    let schema = SharedSchema::compact();
    let index = SharedEntryIndex::new();
    let mut source = TableOptions::new(&[kind])
        .with_schema(schema.clone())
        .with_entry_index(index.clone())
        .build()
        .unwrap();
    let mut target = TableOptions::new(&[kind])
        .with_schema(schema)
        .with_entry_index(index)
        .with_events(Recorder {
            refuse_create: true,
            ..Recorder::default()
        })
        .build()
        .unwrap();
    source.new_entries(4).unwrap();

    assert!(source.transfer_entries(&mut target, &[0]).is_err());
    assert_eq!(source.len(), 4);
    assert!(target.is_empty());
    assert_eq!(source.entry_index().borrow().recyclable().len(), 0);
}

#[test]
fn target_veto_blocks_transfer_without_shared_kinds() {
    let schema = SharedSchema::compact();
    let index = SharedEntryIndex::new();
    let source_log = Recorder::default();
    let mut source = TableOptions::new(&[register_kind::<u32>()])
        .with_schema(schema.clone())
        .with_entry_index(index.clone())
        .with_events(source_log.clone())
        .build()
        .unwrap();
    let mut target = TableOptions::new(&[register_kind::<u64>()])
        .with_schema(schema)
        .with_entry_index(index)
        .with_events(Recorder {
            refuse_create: true,
            ..Recorder::default()
        })
        .build()
        .unwrap();
    source.new_entries(4).unwrap();
    let ids = source.entry_ids().to_vec();

    let err = source.transfer_entries(&mut target, &[0]).unwrap_err();

    assert!(matches!(err.kind, ErrorKind::Vetoed(_)));
    assert_eq!(source.len(), 4);
    assert_eq!(source.entry_ids(), ids.as_slice());
    assert!(target.is_empty());
    assert_eq!(source.entry_index().borrow().recyclable().len(), 0);
    assert_eq!(source_log.events().len(), 2);
}

#[test]
fn source_veto_blocks_transfer_without_shared_kinds() {
    let schema = SharedSchema::compact();
    let index = SharedEntryIndex::new();
    let target_log = Recorder::default();
    let mut source = TableOptions::new(&[register_kind::<u32>()])
        .with_schema(schema.clone())
        .with_entry_index(index.clone())
        .with_events(Recorder {
            refuse_delete: true,
            ..Recorder::default()
        })
        .build()
        .unwrap();
    let mut target = TableOptions::new(&[register_kind::<u64>()])
        .with_schema(schema)
        .with_entry_index(index)
        .with_events(target_log.clone())
        .build()
        .unwrap();
    source.new_entries(2).unwrap();

    assert!(source.transfer_entries(&mut target, &[1]).is_err());
    assert_eq!(source.len(), 2);
    assert!(target.is_empty());
    assert_eq!(target_log.events(), vec![Event::BeforeCreate(1)]);
}

#[test]
fn transfer_without_shared_kinds_fires_both_tables_hooks() {
    let schema = SharedSchema::compact();
    let index = SharedEntryIndex::new();
    let source_log = Recorder::default();
    let target_log = Recorder::default();
    let mut source = TableOptions::new(&[register_kind::<u32>()])
        .with_schema(schema.clone())
        .with_entry_index(index.clone())
        .with_events(source_log.clone())
        .build()
        .unwrap();
    let mut target = TableOptions::new(&[register_kind::<u64>()])
        .with_schema(schema)
        .with_entry_index(index)
        .with_events(target_log.clone())
        .build()
        .unwrap();
    source.new_entries(3).unwrap();
    let moved = source.entry_ids()[2];

    let entries = source.transfer_entries(&mut target, &[2]).unwrap();

    assert_eq!(entries[0].id(), moved);
    assert_eq!(entries[0].recycled(), 1);
    assert_eq!(
        source_log.events()[2..],
        [Event::BeforeDelete(vec![2]), Event::AfterDelete(1)]
    );
    assert_eq!(
        target_log.events(),
        vec![Event::BeforeCreate(1), Event::AfterCreate(vec![0])]
    );
}
