//! Integration tests for containment masks

use densetable_foundation::Mask;

#[test]
fn words_are_independent() {
    let mask = Mask::from_bits([0, 64, 128, 192]);

    for bit in [0, 64, 128, 192] {
        assert!(mask.contains(bit));
    }
    for bit in [1, 63, 65, 191, 193] {
        assert!(!mask.contains(bit));
    }
}

#[test]
fn subset_and_overlap() {
    let table = Mask::from_bits([2, 3, 130]);
    let query = Mask::from_bits([3, 130]);
    let disjoint = Mask::from_bits([4, 131]);

    assert!(table.contains_all(&query));
    assert!(!query.contains_all(&table));
    assert!(table.contains_any(&query));
    assert!(table.contains_none(&disjoint));
}

#[test]
fn count_and_iter_agree() {
    let mask = Mask::from_bits([9, 250, 17, 9]);

    assert_eq!(mask.count(), 3);
    assert_eq!(mask.iter().count(), mask.count());
}

#[test]
fn debug_lists_bits() {
    assert_eq!(format!("{:?}", Mask::from_bits([1, 7])), "{1, 7}");
}
