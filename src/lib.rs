//! Densetable - archetype-style columnar tables
//!
//! This crate re-exports all layers of densetable for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 1: densetable_storage    - Schemas, entry index, tables, accessors
//! Layer 0: densetable_foundation - Data kinds, entries, columns, masks, errors
//! ```

pub use densetable_foundation as foundation;
pub use densetable_storage as storage;
