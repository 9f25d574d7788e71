//! Integration tests for Layer 1: Storage
//!
//! Tests for schemas, entry indices, tables, transfers, hooks, and accessors.

mod accessors;
mod entry_index;
mod events;
