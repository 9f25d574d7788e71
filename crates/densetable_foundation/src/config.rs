//! Process-wide table configuration.
//!
//! Configuration is resolved once: either explicitly through
//! [`Config::install`], or implicitly with defaults the first time
//! [`Config::global`] is read. It cannot change afterwards.

use std::sync::OnceLock;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, ErrorKind, Result};
use crate::mask::Mask;

static CONFIG: OnceLock<Config> = OnceLock::new();

/// How a table caches handles to its columns.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CacheMode {
    /// Type-checked handles, resolved through the column on every access.
    #[default]
    Safe,
    /// Raw base pointers into column storage.
    Fast,
}

/// Which schema a table gets when none is supplied.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SchemaMode {
    /// Slot is always `identity - 1`.
    Identity,
    /// Slots are assigned densely in registration order.
    #[default]
    Compact,
}

/// Table configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Config {
    /// Maximum number of kind identities the containment mask supports.
    pub max_kinds: usize,
    /// Whether table construction registers its kinds into the schema.
    pub auto_register: bool,
    /// Default column cache strategy.
    pub cache_mode: CacheMode,
    /// Default schema variant.
    pub schema_mode: SchemaMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_kinds: Mask::CAPACITY,
            auto_register: true,
            cache_mode: CacheMode::Safe,
            schema_mode: SchemaMode::Compact,
        }
    }
}

impl Config {
    /// Creates a configuration that uses the fast column cache.
    #[must_use]
    pub fn fast() -> Self {
        Self {
            cache_mode: CacheMode::Fast,
            ..Self::default()
        }
    }

    /// Builder method to set the maximum kind count.
    #[must_use]
    pub fn with_max_kinds(mut self, max_kinds: usize) -> Self {
        self.max_kinds = max_kinds;
        self
    }

    /// Builder method to set auto-registration.
    #[must_use]
    pub fn with_auto_register(mut self, auto_register: bool) -> Self {
        self.auto_register = auto_register;
        self
    }

    /// Builder method to set the cache mode.
    #[must_use]
    pub fn with_cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.cache_mode = cache_mode;
        self
    }

    /// Builder method to set the schema mode.
    #[must_use]
    pub fn with_schema_mode(mut self, schema_mode: SchemaMode) -> Self {
        self.schema_mode = schema_mode;
        self
    }

    /// Checks that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if `max_kinds` is zero or wider than the mask.
    pub fn validate(&self) -> Result<()> {
        if self.max_kinds == 0 || self.max_kinds > Mask::CAPACITY {
            return Err(Error::new(ErrorKind::InvalidConfig(format!(
                "max_kinds must be in 1..={}, got {}",
                Mask::CAPACITY,
                self.max_kinds
            ))));
        }
        Ok(())
    }

    /// Installs the process-wide configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a configuration
    /// has already been resolved.
    pub fn install(config: Config) -> Result<()> {
        config.validate()?;
        tracing::debug!(?config, "installing table configuration");
        CONFIG.set(config).map_err(|_| {
            Error::new(ErrorKind::InvalidConfig(
                "configuration already resolved".to_string(),
            ))
        })
    }

    /// Returns the process-wide configuration, resolving defaults on first use.
    #[must_use]
    pub fn global() -> &'static Config {
        CONFIG.get_or_init(Config::default)
    }
}
