// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{JarsyncError, Result};

/// Load a configuration file and return the raw, unvalidated model.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        JarsyncError::ConfigError(format!("reading config file at {:?}: {e}", path))
    })?;

    let config: RawConfigFile = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw = load_from_path(&path)?;
    ConfigFile::try_from(raw)
}

/// Load the config the user asked for, if any.
///
/// - An explicit path must exist.
/// - Otherwise [`default_config_path`] is used when present.
/// - With neither, the built-in defaults apply.
pub fn load_optional(explicit: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = explicit {
        return load_and_validate(path);
    }

    let default_path = default_config_path();
    if default_path.is_file() {
        debug!(path = ?default_path, "loading default config file");
        return load_and_validate(default_path);
    }

    Ok(ConfigFile::default())
}

/// `Jarsync.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Jarsync.toml")
}
