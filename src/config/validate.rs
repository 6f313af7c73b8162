// src/config/validate.rs

use crate::archive::ExcludeSet;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{JarsyncError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = JarsyncError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        let exclude = ExcludeSet::new(&raw.archive.exclude)?;
        Ok(ConfigFile::new_unchecked(raw.archive, raw.monitor, exclude))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_paths(cfg)?;
    validate_monitor(cfg)?;
    Ok(())
}

fn validate_paths(cfg: &RawConfigFile) -> Result<()> {
    for (key, value) in [
        ("source", &cfg.archive.source),
        ("output", &cfg.archive.output),
    ] {
        if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(JarsyncError::ConfigError(format!(
                "[archive].{key} must not be empty"
            )));
        }
    }
    Ok(())
}

fn validate_monitor(cfg: &RawConfigFile) -> Result<()> {
    if cfg.monitor.interval_secs == Some(0) {
        return Err(JarsyncError::ConfigError(
            "[monitor].interval_secs must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
