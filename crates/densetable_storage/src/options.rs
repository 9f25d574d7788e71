//! Table construction options.

use std::fmt;

use densetable_foundation::{CacheMode, Config, DataKind, Result};

use crate::entry_index::SharedEntryIndex;
use crate::events::TableEvents;
use crate::schema::SharedSchema;
use crate::table::Table;

/// Everything needed to build a [`Table`]. Unset fields fall back to the
/// process configuration.
#[derive(Default)]
pub struct TableOptions {
    /// Schema to resolve slots through. Defaults to a fresh schema of the
    /// configured variant.
    pub schema: Option<SharedSchema>,
    /// Index to issue identities from. Defaults to a fresh index.
    pub entry_index: Option<SharedEntryIndex>,
    /// Kinds the table stores. Must not be empty.
    pub kinds: Vec<DataKind>,
    /// Lifecycle hooks.
    pub events: Option<Box<dyn TableEvents>>,
    /// Cache strategy. Defaults to [`Config::cache_mode`].
    pub cache_mode: Option<CacheMode>,
    /// Whether to register `kinds` into the schema. Defaults to
    /// [`Config::auto_register`].
    pub auto_register: Option<bool>,
}

impl TableOptions {
    /// Creates options for a table storing `kinds`.
    #[must_use]
    pub fn new(kinds: &[DataKind]) -> Self {
        Self {
            kinds: kinds.to_vec(),
            ..Self::default()
        }
    }

    /// Builder method to share a schema.
    #[must_use]
    pub fn with_schema(mut self, schema: SharedSchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Builder method to share an entry index.
    #[must_use]
    pub fn with_entry_index(mut self, entry_index: SharedEntryIndex) -> Self {
        self.entry_index = Some(entry_index);
        self
    }

    /// Builder method to install lifecycle hooks.
    #[must_use]
    pub fn with_events(mut self, events: impl TableEvents + 'static) -> Self {
        self.events = Some(Box::new(events));
        self
    }

    /// Builder method to choose the cache strategy.
    #[must_use]
    pub fn with_cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.cache_mode = Some(cache_mode);
        self
    }

    /// Builder method to choose whether kinds are registered on build.
    #[must_use]
    pub fn with_auto_register(mut self, auto_register: bool) -> Self {
        self.auto_register = Some(auto_register);
        self
    }

    /// Builds the table.
    ///
    /// # Errors
    ///
    /// Returns an error if no kinds were given, a kind is unknown to the
    /// schema and auto-registration is off, or a kind's slot does not fit
    /// the containment mask.
    pub fn build(self) -> Result<Table> {
        let config = Config::global();
        Table::from_parts(TableParts {
            schema: self.schema.unwrap_or_else(SharedSchema::from_config),
            entry_index: self.entry_index.unwrap_or_default(),
            kinds: self.kinds,
            events: self.events,
            cache_mode: self.cache_mode.unwrap_or(config.cache_mode),
            auto_register: self.auto_register.unwrap_or(config.auto_register),
        })
    }
}

impl fmt::Debug for TableOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableOptions")
            .field("schema", &self.schema)
            .field("entry_index", &self.entry_index.is_some())
            .field("kinds", &self.kinds)
            .field("events", &self.events.is_some())
            .field("cache_mode", &self.cache_mode)
            .field("auto_register", &self.auto_register)
            .finish()
    }
}

/// Options with every default resolved.
pub(crate) struct TableParts {
    pub(crate) schema: SharedSchema,
    pub(crate) entry_index: SharedEntryIndex,
    pub(crate) kinds: Vec<DataKind>,
    pub(crate) events: Option<Box<dyn TableEvents>>,
    pub(crate) cache_mode: CacheMode,
    pub(crate) auto_register: bool,
}
