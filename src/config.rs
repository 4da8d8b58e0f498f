//! Runtime settings, loaded from an optional TOML file.
//!
//! Every field has a default, so an empty file (or no file) is valid.
//! Command-line flags override what the file says.
//!
//! ```toml
//! source = "https://example.org/diagrams"
//!
//! [cache]
//! fetch_ttl_secs = 60
//! probe_ttl_secs = 300
//!
//! [naming]
//! legacy_base_name = "data"
//!
//! [naming.overrides]
//! "10. Oil Lubricating System" = ["Oil-System"]
//!
//! [catalog]
//! strict = false
//! require_table = false
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cache::{DEFAULT_FETCH_TTL, DEFAULT_PROBE_TTL};
use crate::catalog::resolver::CatalogOptions;
use crate::parsing::table::{NamePolicy, TableOptions};
use crate::resolve::naming::NamingRules;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheSettings {
    pub fetch_ttl_secs: u64,
    pub probe_ttl_secs: u64,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            fetch_ttl_secs: DEFAULT_FETCH_TTL.as_secs(),
            probe_ttl_secs: DEFAULT_PROBE_TTL.as_secs(),
        }
    }
}

impl CacheSettings {
    #[must_use]
    pub fn fetch_ttl(&self) -> Duration {
        Duration::from_secs(self.fetch_ttl_secs)
    }

    #[must_use]
    pub fn probe_ttl(&self) -> Duration {
        Duration::from_secs(self.probe_ttl_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TableSettings {
    pub delimiter: char,
    pub name_policy: NamePolicy,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            delimiter: ',',
            name_policy: NamePolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpSettings {
    /// Per-request timeout; none by default
    pub timeout_secs: Option<u64>,
}

/// All runtime settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Base URL or local directory holding the diagram folders
    pub source: Option<String>,
    pub cache: CacheSettings,
    pub naming: NamingRules,
    pub catalog: CatalogOptions,
    pub table: TableSettings,
    pub http: HttpSettings,
}

impl Settings {
    /// Load settings from a TOML file
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read, or
    /// `ConfigError::Parse`/`ConfigError::Invalid` if its content is invalid.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML text
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Parse` for malformed TOML or unknown keys, or
    /// `ConfigError::Invalid` if a value is out of range.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check value ranges that the TOML types cannot express
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` describing the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.table.delimiter.is_ascii() || self.table.delimiter == '"' {
            return Err(ConfigError::Invalid(format!(
                "table delimiter must be a single ASCII character other than '\"', got {:?}",
                self.table.delimiter
            )));
        }
        if self.naming.legacy_base_name.contains('/') {
            return Err(ConfigError::Invalid(
                "legacy_base_name must not contain '/'".to_string(),
            ));
        }
        Ok(())
    }

    #[must_use]
    pub fn table_options(&self) -> TableOptions {
        TableOptions {
            delimiter: u8::try_from(self.table.delimiter).unwrap_or(b','),
            name_policy: self.table.name_policy,
        }
    }

    #[must_use]
    pub fn http_timeout(&self) -> Option<Duration> {
        self.http.timeout_secs.map(Duration::from_secs)
    }
}
