//! Integration tests for accessors
//!
//! Tests per-call and locked accessors across tables and cache modes.

use densetable_foundation::{CacheMode, register_kind};
use densetable_storage::{Accessor, SharedSchema, Table, TableOptions};

#[derive(Clone, Default, Debug, PartialEq)]
struct Position {
    x: i32,
    y: i32,
}

#[test]
fn accessor_finds_kind_in_any_table() {
    let position = register_kind::<Position>();
    let velocity = register_kind::<Position>();
    let accessor = Accessor::<Position>::new(position).unwrap();
    let mut walker = Table::new(&[position]).unwrap();
    let mut runner = Table::new(&[velocity, position]).unwrap();
    walker.new_entries(2).unwrap();
    runner.new_entries(3).unwrap();

    *accessor.get_mut(1, &mut walker).unwrap() = Position { x: 1, y: 1 };
    *accessor.get_mut(2, &mut runner).unwrap() = Position { x: 2, y: 2 };

    assert_eq!(walker.get::<Position>(position, 1).unwrap().x, 1);
    assert_eq!(runner.get::<Position>(position, 2).unwrap().x, 2);
    assert_eq!(*runner.get::<Position>(velocity, 2).unwrap(), Position::default());
}

#[test]
fn locked_accessor_hot_loop() {
    let position = register_kind::<Position>();
    let schema = SharedSchema::compact();

    for mode in [CacheMode::Safe, CacheMode::Fast] {
        let mut table = TableOptions::new(&[position])
            .with_schema(schema.clone())
            .with_cache_mode(mode)
            .build()
            .unwrap();
        table.new_entries(64).unwrap();
        let locked = Accessor::<Position>::new(position)
            .unwrap()
            .lock(&schema)
            .unwrap();

        for row in 0..table.len() {
            let value = locked.get_mut(row, &mut table).unwrap();
            value.x = i32::try_from(row).unwrap();
            value.y = -value.x;
        }

        let sum: i32 = (0..table.len())
            .map(|row| {
                // SAFETY: the table is on `schema`, stores `position`, and
                // `row < len`.
                let value = unsafe { locked.get_unchecked(row, &table) };
                value.x + value.y
            })
            .sum();
        assert_eq!(sum, 0);
        assert_eq!(table.get::<Position>(position, 63).unwrap().x, 63);
    }
}

#[test]
fn locked_accessor_skips_tables_without_kind() {
    let position = register_kind::<Position>();
    let schema = SharedSchema::compact();
    schema.borrow_mut().register(&[position]);
    let locked = Accessor::<Position>::new(position)
        .unwrap()
        .lock(&schema)
        .unwrap();

    let mut table = TableOptions::new(&[register_kind::<u8>()])
        .with_schema(schema)
        .with_cache_mode(CacheMode::Fast)
        .build()
        .unwrap();
    table.new_entries(1).unwrap();

    assert!(!locked.check(&table));
    assert!(locked.get(0, &table).is_none());
}

#[test]
fn accessor_sees_values_after_deletion() {
    let position = register_kind::<Position>();
    let accessor = Accessor::<Position>::new(position).unwrap();
    let mut table = TableOptions::new(&[position])
        .with_cache_mode(CacheMode::Fast)
        .build()
        .unwrap();
    table.new_entries(3).unwrap();
    table.set(position, Position { x: 3, y: 3 }, 2).unwrap();

    table.delete_entries(&[0]).unwrap();

    assert_eq!(accessor.get(0, &table), Some(&Position { x: 3, y: 3 }));
    assert!(accessor.get(2, &table).is_none());
}
