//! Configuration types for the Playmap pipeline.
//!
//! Every section is optional in TOML; missing fields take their defaults.
//!
//! ```toml
//! [resolver]
//! scheme = "blob"
//! origin = "playmap"
//! alias_prefix = "/"
//!
//! [relay]
//! buffer_capacity = 500
//! discard_stale = true
//!
//! [project]
//! entry_file = "index.html"
//! storage_key = "playmap:files"
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaymapConfig {
    /// Module resolution settings.
    pub resolver: ResolverConfig,
    /// Telemetry relay settings.
    pub relay: RelayConfig,
    /// Project layout and persistence settings.
    pub project: ProjectConfig,
}

impl PlaymapConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML text.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a TOML file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Check values that parse but cannot be used.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.resolver.scheme.is_empty() || self.resolver.scheme.contains(':') {
            return Err(ConfigError::Invalid(format!(
                "resolver.scheme must be a non-empty scheme name, got '{}'",
                self.resolver.scheme
            )));
        }
        if self.resolver.alias_prefix.is_empty() {
            return Err(ConfigError::Invalid(
                "resolver.alias_prefix must not be empty".to_string(),
            ));
        }
        if self.relay.buffer_capacity == Some(0) {
            return Err(ConfigError::Invalid(
                "relay.buffer_capacity must be at least 1".to_string(),
            ));
        }
        if self.project.entry_file.is_empty() {
            return Err(ConfigError::Invalid(
                "project.entry_file must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Set the resolver section.
    pub fn with_resolver(mut self, resolver: ResolverConfig) -> Self {
        self.resolver = resolver;
        self
    }

    /// Set the relay section.
    pub fn with_relay(mut self, relay: RelayConfig) -> Self {
        self.relay = relay;
        self
    }

    /// Set the project section.
    pub fn with_project(mut self, project: ProjectConfig) -> Self {
        self.project = project;
        self
    }
}

/// How ephemeral resource references and import specifiers are formed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Scheme of minted locators.
    ///
    /// Defaults to `blob`.
    pub scheme: String,

    /// Origin segment of minted locators.
    ///
    /// Defaults to `playmap`.
    pub origin: String,

    /// Prefix of the rooted alias registered next to each bare file name.
    ///
    /// Defaults to `/`.
    pub alias_prefix: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            scheme: "blob".to_string(),
            origin: "playmap".to_string(),
            alias_prefix: "/".to_string(),
        }
    }
}

impl ResolverConfig {
    /// Set the locator scheme.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    /// Set the locator origin.
    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = origin.into();
        self
    }

    /// Set the rooted alias prefix.
    pub fn with_alias_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.alias_prefix = prefix.into();
        self
    }
}

/// Telemetry relay behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Maximum number of log entries kept; oldest are dropped first.
    ///
    /// `None` keeps every entry of the run.
    pub buffer_capacity: Option<usize>,

    /// Drop messages tagged with a run other than the active one.
    pub discard_stale: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: None,
            discard_stale: true,
        }
    }
}

impl RelayConfig {
    /// Bound the log buffer.
    pub fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = Some(capacity);
        self
    }

    /// Enable or disable stale message filtering.
    pub fn with_discard_stale(mut self, enabled: bool) -> Self {
        self.discard_stale = enabled;
        self
    }
}

/// Project layout and persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Name of the file used as the entry document.
    pub entry_file: String,

    /// Key under which the file table is persisted.
    pub storage_key: String,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            entry_file: "index.html".to_string(),
            storage_key: "playmap:files".to_string(),
        }
    }
}

impl ProjectConfig {
    /// Set the entry file name.
    pub fn with_entry_file(mut self, name: impl Into<String>) -> Self {
        self.entry_file = name.into();
        self
    }

    /// Set the persistence key.
    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }
}
