// src/config/model.rs

use serde::Deserialize;

use crate::archive::ExcludeSet;
use crate::types::Compression;

/// Configuration exactly as read from TOML, before validation.
///
/// ```toml
/// [archive]
/// source = "app"
/// output = "dist/app.jar"
/// compression = "deflated"
/// exclude = ["**/*.tmp", "build/**"]
/// allow_nested_output = false
/// atomic = true
///
/// [monitor]
/// watch = true
/// interval_secs = 5
/// ```
///
/// Every section and key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub archive: ArchiveSection,

    #[serde(default)]
    pub monitor: MonitorSection,
}

/// `[archive]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveSection {
    /// Directory to package. Prompted for when absent.
    #[serde(default)]
    pub source: Option<String>,

    /// Archive path. Defaults to `<source basename>.jar`.
    #[serde(default)]
    pub output: Option<String>,

    #[serde(default)]
    pub compression: Compression,

    /// Globs (relative to the source root) left out of the archive and
    /// ignored by the monitor.
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Allow the archive to live inside the directory it packages.
    #[serde(default)]
    pub allow_nested_output: bool,

    /// Write through a temporary file and rename on success.
    #[serde(default = "default_atomic")]
    pub atomic: bool,
}

fn default_atomic() -> bool {
    true
}

impl Default for ArchiveSection {
    fn default() -> Self {
        Self {
            source: None,
            output: None,
            compression: Compression::default(),
            exclude: Vec::new(),
            allow_nested_output: false,
            atomic: default_atomic(),
        }
    }
}

/// `[monitor]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonitorSection {
    /// Keep watching after the first build. Prompted for when absent.
    #[serde(default)]
    pub watch: Option<bool>,

    /// Seconds between polls. Defaults to 5.
    #[serde(default)]
    pub interval_secs: Option<u64>,
}

/// Validated configuration.
///
/// Only constructible through `TryFrom<RawConfigFile>` (see `validate.rs`) or
/// `Default`, so the exclude patterns are known to compile.
#[derive(Debug, Clone, Default)]
pub struct ConfigFile {
    pub archive: ArchiveSection,
    pub monitor: MonitorSection,
    exclude: ExcludeSet,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        archive: ArchiveSection,
        monitor: MonitorSection,
        exclude: ExcludeSet,
    ) -> Self {
        Self {
            archive,
            monitor,
            exclude,
        }
    }

    /// Compiled `[archive].exclude` patterns.
    pub fn exclude(&self) -> &ExcludeSet {
        &self.exclude
    }
}
