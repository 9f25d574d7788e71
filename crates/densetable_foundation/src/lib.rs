//! Data kinds, entry identities, columns, and errors for densetable.
//!
//! This crate provides:
//! - [`DataKind`] - Registered data types with stable identities
//! - [`EntryId`] and [`Entry`] - Recyclable record identities
//! - [`Column`] - Type-erased, densely packed column storage
//! - [`Mask`] - Fixed-width containment bitsets
//! - [`Config`] - Process-wide table configuration
//! - [`Error`] - Error types shared by every layer

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod column;
pub mod config;
pub mod entry;
pub mod error;
pub mod kind;
pub mod mask;

pub use column::Column;
pub use config::{CacheMode, Config, SchemaMode};
pub use entry::{Entry, EntryId};
pub use error::{Error, ErrorKind, KindList, Result};
pub use kind::{DataKind, DataKindId, register_kind, registered_kind_count};
pub use mask::Mask;
