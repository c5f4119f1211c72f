//! Binder configuration, loaded from TOML.
//!
//! ```toml
//! [binding]
//! on_duplicate_table = "overwrite" # or "reject"
//! ignore_unknown_skip = true
//!
//! [params]
//! allow_unknown = false
//! ```
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use thiserror::Error as ThisError;

///
/// ConfigError
///

#[derive(Debug, ThisError)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

///
/// BinderConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BinderConfig {
    pub binding: BindingConfig,
    pub params: ParamsConfig,
}

impl BinderConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;

        Self::from_toml_str(&text)
    }
}

///
/// BindingConfig
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct BindingConfig {
    pub on_duplicate_table: DuplicateTablePolicy,

    /// When false, a skip entry naming no column is a parameter error.
    pub ignore_unknown_skip: bool,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            on_duplicate_table: DuplicateTablePolicy::default(),
            ignore_unknown_skip: true,
        }
    }
}

///
/// DuplicateTablePolicy
/// What happens when a second class binds a table that already has one.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateTablePolicy {
    /// Latest binding wins.
    #[default]
    Overwrite,
    Reject,
}

///
/// ParamsConfig
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParamsConfig {
    /// Let `new` ignore parameters it does not recognise.
    pub allow_unknown: bool,
}
