//! Error types for densetable.
//!
//! Uses `thiserror` for ergonomic error definition with rich context.

use std::fmt;

use thiserror::Error;

use crate::entry::EntryId;
use crate::kind::DataKind;

/// The main error type for table operations.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind }
    }

    /// Creates an index out of bounds error.
    #[must_use]
    pub fn index_out_of_bounds(index: usize, upper_bound: usize) -> Self {
        Self::new(ErrorKind::IndexOutOfBounds { index, upper_bound })
    }

    /// Creates an invalid kind access error listing the kinds that are valid.
    #[must_use]
    pub fn invalid_kind_access(kind: DataKind, valid: Vec<DataKind>) -> Self {
        Self::new(ErrorKind::InvalidKindAccess {
            kind,
            valid: KindList(valid),
        })
    }

    /// Creates an invalid entry access error.
    #[must_use]
    pub fn invalid_entry_access(id: EntryId) -> Self {
        Self::new(ErrorKind::InvalidEntryAccess(id))
    }

    /// Creates a batch operation error.
    #[must_use]
    pub fn batch_operation(count: usize) -> Self {
        Self::new(ErrorKind::BatchOperation { count })
    }

    /// Creates a batch deletion error.
    #[must_use]
    pub fn batch_deletion(count: usize, capacity: usize) -> Self {
        Self::new(ErrorKind::BatchDeletion { count, capacity })
    }

    /// Creates a type mismatch error for typed column access.
    #[must_use]
    pub fn type_mismatch(kind: DataKind, requested: &'static str) -> Self {
        Self::new(ErrorKind::TypeMismatch { kind, requested })
    }

    /// Creates a veto error, returned by lifecycle hooks.
    #[must_use]
    pub fn vetoed(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::Vetoed(reason.into()))
    }

    /// Returns true if this is a bounds error.
    #[must_use]
    pub fn is_out_of_bounds(&self) -> bool {
        matches!(self.kind, ErrorKind::IndexOutOfBounds { .. })
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ErrorKind {
    /// Index or row outside the valid range.
    #[error("access error: index {index} out of bounds [0, {upper_bound}]")]
    IndexOutOfBounds {
        /// The index that was accessed.
        index: usize,
        /// The bound the index was checked against.
        upper_bound: usize,
    },

    /// The requested data kind is not stored by the table.
    #[error("invalid kind access: {kind} is not stored, valid kinds are [{valid}]")]
    InvalidKindAccess {
        /// The kind that was requested.
        kind: DataKind,
        /// The kinds the table does store.
        valid: KindList,
    },

    /// The entry slot is tombstoned.
    #[error("cannot access invalid entry {0}")]
    InvalidEntryAccess(EntryId),

    /// A batch size was zero.
    #[error("batch operation error: amount {count} is invalid")]
    BatchOperation {
        /// The requested batch size.
        count: usize,
    },

    /// A batch was empty or larger than what is available.
    #[error("batch deletion error: amount {count} is invalid for capacity {capacity}")]
    BatchDeletion {
        /// The requested batch size.
        count: usize,
        /// The number of items available.
        capacity: usize,
    },

    /// Source and target tables do not share an entry index.
    #[error("transfer error: entry index mismatch")]
    TransferIndexMismatch,

    /// A table was constructed without any data kinds.
    #[error("cannot create a table without any data kinds")]
    NoDataKinds,

    /// A table was constructed with a kind its schema does not know.
    #[error("data kind {0} is not registered in the schema")]
    UnregisteredKind(DataKind),

    /// A column slot does not fit in the containment mask.
    #[error("slot {slot} exceeds the containment mask width of {max}")]
    MaskOverflow {
        /// The offending slot.
        slot: usize,
        /// The mask width.
        max: usize,
    },

    /// Typed access used a Rust type other than the kind's.
    #[error("type mismatch: {kind} cannot be accessed as {requested}")]
    TypeMismatch {
        /// The kind being accessed.
        kind: DataKind,
        /// The Rust type the caller asked for.
        requested: &'static str,
    },

    /// A lifecycle hook refused the operation.
    #[error("operation vetoed: {0}")]
    Vetoed(String),

    /// The configuration was rejected.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// The kinds carried by [`ErrorKind::InvalidKindAccess`], for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct KindList(pub Vec<DataKind>);

impl fmt::Display for KindList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, kind) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{kind}")?;
        }
        Ok(())
    }
}

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, Error>;
