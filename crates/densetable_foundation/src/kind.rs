//! Data kind registry.
//!
//! A [`DataKind`] is a registered Rust type with a stable numeric identity.
//! Identities are handed out by a process-wide counter, start at 1, and are
//! never reclaimed.

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU32, Ordering};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::column::{ColumnData, typed_column};

/// Next identity to hand out. Zero is reserved.
static NEXT_KIND_ID: AtomicU32 = AtomicU32::new(1);

/// Identity of a registered data kind. Never zero.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DataKindId(NonZeroU32);

impl DataKindId {
    /// Creates an identity from its raw value, if non-zero.
    #[must_use]
    pub const fn new(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    /// Returns the raw identity.
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0.get()
    }

    /// Returns `identity - 1`, the zero-based position of this identity.
    #[must_use]
    pub const fn index(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl fmt::Debug for DataKindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataKindId({})", self.0)
    }
}

/// A registered data kind: identity, Rust type, and element footprint.
///
/// Kinds are cheap to copy and compare by identity only. Registering the
/// same Rust type twice yields two distinct kinds.
#[derive(Copy, Clone)]
pub struct DataKind {
    id: DataKindId,
    type_id: TypeId,
    type_name: &'static str,
    footprint: u32,
    make_column: fn() -> Box<dyn ColumnData>,
}

impl DataKind {
    /// Returns the kind's identity.
    #[must_use]
    pub const fn id(&self) -> DataKindId {
        self.id
    }

    /// Returns the `TypeId` of the Rust type stored by this kind.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Returns the name of the Rust type stored by this kind.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns the element size rounded up to the element alignment.
    #[must_use]
    pub const fn footprint(&self) -> u32 {
        self.footprint
    }

    /// Returns true if this kind stores values of type `T`.
    #[must_use]
    pub fn is<T: 'static>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    pub(crate) fn new_column_data(&self) -> Box<dyn ColumnData> {
        (self.make_column)()
    }
}

impl PartialEq for DataKind {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for DataKind {}

impl Hash for DataKind {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DataKind({}: {})", self.id.get(), self.type_name)
    }
}

impl fmt::Display for DataKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.type_name, self.id.get())
    }
}

/// Registers a new data kind for `T` and returns it.
///
/// Every call assigns the next identity, so calling this twice for the same
/// type produces two kinds with separate columns.
///
/// # Panics
///
/// Panics if the identity counter overflows `u32` or the type's footprint
/// does not fit in a `u32`.
#[must_use]
pub fn register_kind<T: Clone + Default + 'static>() -> DataKind {
    let raw = NEXT_KIND_ID.fetch_add(1, Ordering::Relaxed);
    let id = DataKindId::new(raw).expect("data kind identity counter overflowed");
    DataKind {
        id,
        type_id: TypeId::of::<T>(),
        type_name: std::any::type_name::<T>(),
        footprint: footprint_of::<T>(),
        make_column: typed_column::<T>,
    }
}

/// Returns how many kinds have been registered in this process.
#[must_use]
pub fn registered_kind_count() -> usize {
    (NEXT_KIND_ID.load(Ordering::Relaxed) - 1) as usize
}

fn footprint_of<T>() -> u32 {
    let size = std::mem::size_of::<T>();
    let align = std::mem::align_of::<T>();
    u32::try_from(size.div_ceil(align) * align).expect("data kind footprint exceeds u32")
}
