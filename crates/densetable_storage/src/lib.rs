//! Columnar tables, schemas, entry indices, and accessors for densetable.
//!
//! This crate provides:
//! - [`Schema`] - Data kind to column slot mapping ([`IdentitySchema`], [`CompactSchema`])
//! - [`EntryIndex`] - Recyclable identity allocation and row tracking
//! - [`Table`] - Dense column storage with swap-and-truncate deletion
//! - [`TableOptions`] - Table construction
//! - [`TableEvents`] - Creation and deletion hooks
//! - [`Accessor`] and [`LockedAccessor`] - Typed per-kind access

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod accessor;
mod cache;
pub mod entry_index;
pub mod events;
pub mod options;
pub mod schema;
pub mod table;

pub use accessor::{Accessor, LockedAccessor};
pub use entry_index::{EntryIndex, SharedEntryIndex};
pub use events::TableEvents;
pub use options::TableOptions;
pub use schema::{CompactSchema, IdentitySchema, Schema, SharedSchema};
pub use table::Table;
