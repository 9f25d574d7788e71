//! Schemas map data kinds to table-local column slots.
//!
//! Two variants are provided:
//! - [`IdentitySchema`]: slot is always `identity - 1`. Nothing to register,
//!   but every table built on it reserves a slot for every kind in the
//!   process.
//! - [`CompactSchema`]: slots are handed out in first-registration order, so
//!   a table that uses a handful of kinds gets a handful of slots.
//!
//! Tables share a schema through [`SharedSchema`].

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use densetable_foundation::{
    Config, DataKind, DataKindId, Error, Result, SchemaMode, registered_kind_count,
};

/// Maps data kinds to column slots.
pub trait Schema: fmt::Debug {
    /// Registers kinds. Registering a kind twice is a no-op.
    fn register(&mut self, kinds: &[DataKind]);

    /// Returns the number of slots this schema addresses.
    fn registered(&self) -> usize;

    /// Returns true if the schema can resolve a slot for `kind`.
    fn contains(&self, kind: DataKindId) -> bool;

    /// Returns true if the schema can resolve a slot for every kind.
    fn contains_all(&self, kinds: &[DataKind]) -> bool {
        kinds.iter().all(|kind| self.contains(kind.id()))
    }

    /// Resolves the column slot for `kind`.
    ///
    /// # Errors
    ///
    /// Returns a bounds error if the schema has no slot for `kind`.
    fn slot_for(&self, kind: DataKindId) -> Result<usize>;
}

/// Schema whose slot for a kind is always `identity - 1`.
#[derive(Clone, Debug)]
pub struct IdentitySchema {
    max_kinds: usize,
}

impl Default for IdentitySchema {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentitySchema {
    /// Creates an identity schema bounded by the configured kind maximum.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_kinds(Config::global().max_kinds)
    }

    /// Creates an identity schema that contains identities up to `max_kinds`.
    #[must_use]
    pub fn with_max_kinds(max_kinds: usize) -> Self {
        Self { max_kinds }
    }

    /// Returns the highest identity this schema contains.
    #[must_use]
    pub fn max_kinds(&self) -> usize {
        self.max_kinds
    }
}

impl Schema for IdentitySchema {
    fn register(&mut self, _kinds: &[DataKind]) {}

    fn registered(&self) -> usize {
        registered_kind_count()
    }

    fn contains(&self, kind: DataKindId) -> bool {
        kind.get() as usize <= self.max_kinds
    }

    fn slot_for(&self, kind: DataKindId) -> Result<usize> {
        Ok(kind.index())
    }
}

/// Schema that assigns slots densely in first-registration order.
#[derive(Clone, Debug, Default)]
pub struct CompactSchema {
    registered: usize,
    /// Indexed by `identity - 1`; holds `slot + 1`, so 0 means absent.
    slots: Vec<u32>,
}

impl CompactSchema {
    /// Creates an empty compact schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_len(&mut self, required: usize) {
        if self.slots.len() < required {
            self.slots.resize(required, 0);
        }
    }
}

impl Schema for CompactSchema {
    fn register(&mut self, kinds: &[DataKind]) {
        for kind in kinds {
            if self.contains(kind.id()) {
                continue;
            }
            let index = kind.id().index();
            self.ensure_len(index + 1);
            self.registered += 1;
            self.slots[index] =
                u32::try_from(self.registered).expect("compact schema slot count exceeds u32");
        }
    }

    fn registered(&self) -> usize {
        self.registered
    }

    fn contains(&self, kind: DataKindId) -> bool {
        self.slots.get(kind.index()).is_some_and(|slot| *slot != 0)
    }

    /// # Panics
    ///
    /// Panics if `kind` has a higher identity than every kind this schema
    /// has seen.
    fn slot_for(&self, kind: DataKindId) -> Result<usize> {
        let index = kind.index();
        assert!(
            index < self.slots.len(),
            "data kind {} is beyond every kind registered in this schema ({} slots)",
            kind.get(),
            self.slots.len()
        );
        match self.slots[index] {
            0 => Err(Error::index_out_of_bounds(index, self.slots.len())),
            slot => Ok(slot as usize - 1),
        }
    }
}

/// A schema shared by reference between tables.
///
/// Clones point to the same schema.
#[derive(Clone)]
pub struct SharedSchema(Rc<RefCell<dyn Schema>>);

impl SharedSchema {
    /// Wraps a schema for sharing.
    pub fn new(schema: impl Schema + 'static) -> Self {
        Self(Rc::new(RefCell::new(schema)))
    }

    /// Creates a shared [`IdentitySchema`].
    #[must_use]
    pub fn identity() -> Self {
        Self::new(IdentitySchema::new())
    }

    /// Creates a shared [`CompactSchema`].
    #[must_use]
    pub fn compact() -> Self {
        Self::new(CompactSchema::new())
    }

    /// Creates the schema variant selected by the process configuration.
    #[must_use]
    pub fn from_config() -> Self {
        match Config::global().schema_mode {
            SchemaMode::Identity => Self::identity(),
            SchemaMode::Compact => Self::compact(),
        }
    }

    /// Borrows the schema.
    ///
    /// # Panics
    ///
    /// Panics if the schema is currently borrowed mutably.
    #[must_use]
    pub fn borrow(&self) -> Ref<'_, dyn Schema> {
        self.0.borrow()
    }

    /// Borrows the schema mutably.
    ///
    /// # Panics
    ///
    /// Panics if the schema is currently borrowed.
    #[must_use]
    pub fn borrow_mut(&self) -> RefMut<'_, dyn Schema> {
        self.0.borrow_mut()
    }

    /// Returns true if both handles refer to the same schema.
    #[must_use]
    pub fn ptr_eq(&self, other: &SharedSchema) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Returns an address identifying the shared schema.
    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl fmt::Debug for SharedSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SharedSchema").field(&*self.0.borrow()).finish()
    }
}
