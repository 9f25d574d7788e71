//! Integration tests for Error types
//!
//! Tests error construction, display, and error kinds.

use densetable_foundation::{EntryId, Error, ErrorKind, KindList, register_kind};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_index_out_of_bounds() {
    let err = Error::index_out_of_bounds(90, 5);

    assert!(err.is_out_of_bounds());
    assert_eq!(
        format!("{err}"),
        "access error: index 90 out of bounds [0, 5]"
    );
}

#[test]
fn error_invalid_entry_access() {
    let err = Error::invalid_entry_access(EntryId(7));

    assert_eq!(err.kind, ErrorKind::InvalidEntryAccess(EntryId(7)));
    assert!(format!("{err}").contains("Entry(7)"));
}

#[test]
fn error_batch_operation() {
    let err = Error::batch_operation(0);

    assert_eq!(err.kind, ErrorKind::BatchOperation { count: 0 });
    assert!(!err.is_out_of_bounds());
}

#[test]
fn error_batch_deletion_message() {
    let err = Error::batch_deletion(6, 5);
    assert_eq!(
        format!("{err}"),
        "batch deletion error: amount 6 is invalid for capacity 5"
    );
}

#[test]
fn error_type_mismatch_names_both_types() {
    let kind = register_kind::<u32>();
    let msg = format!("{}", Error::type_mismatch(kind, "i64"));

    assert!(msg.contains("u32"));
    assert!(msg.contains("i64"));
}

// =============================================================================
// Kind Lists
// =============================================================================

#[test]
fn kind_list_display_is_comma_separated() {
    let a = register_kind::<u8>();
    let b = register_kind::<u16>();

    assert_eq!(format!("{}", KindList(vec![a, b])), format!("{a}, {b}"));
    assert_eq!(format!("{}", KindList::default()), "");
}

#[test]
fn invalid_kind_access_carries_valid_kinds() {
    let wanted = register_kind::<String>();
    let stored = register_kind::<u64>();
    let err = Error::invalid_kind_access(wanted, vec![stored]);

    let ErrorKind::InvalidKindAccess { kind, valid } = err.kind else {
        panic!("expected invalid kind access");
    };
    assert_eq!(kind, wanted);
    assert_eq!(valid.0, vec![stored]);
}

#[test]
fn structural_errors_have_messages() {
    for kind in [
        ErrorKind::TransferIndexMismatch,
        ErrorKind::NoDataKinds,
        ErrorKind::MaskOverflow { slot: 300, max: 256 },
        ErrorKind::Vetoed("busy".to_string()),
    ] {
        assert!(!format!("{}", Error::new(kind)).is_empty());
    }
}
