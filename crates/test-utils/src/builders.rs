#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use jarsync::config::{ConfigFile, RawConfigFile};
use jarsync::types::Compression;

/// Writes a directory tree on disk for a test.
pub struct TreeBuilder {
    root: PathBuf,
}

impl TreeBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        fs::create_dir_all(&root).expect("create tree root");
        Self { root }
    }

    pub fn file(self, rel: &str, content: impl AsRef<[u8]>) -> Self {
        let path = self.root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create parent dirs");
        }
        fs::write(&path, content).expect("write test file");
        self
    }

    pub fn dir(self, rel: &str) -> Self {
        fs::create_dir_all(self.root.join(rel)).expect("create dir");
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn build(self) -> PathBuf {
        self.root
    }
}

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn source(mut self, source: &str) -> Self {
        self.config.archive.source = Some(source.to_string());
        self
    }

    pub fn output(mut self, output: &str) -> Self {
        self.config.archive.output = Some(output.to_string());
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.archive.exclude.push(pattern.to_string());
        self
    }

    pub fn compression(mut self, compression: Compression) -> Self {
        self.config.archive.compression = compression;
        self
    }

    pub fn allow_nested_output(mut self, val: bool) -> Self {
        self.config.archive.allow_nested_output = val;
        self
    }

    pub fn atomic(mut self, val: bool) -> Self {
        self.config.archive.atomic = val;
        self
    }

    pub fn watch(mut self, val: bool) -> Self {
        self.config.monitor.watch = Some(val);
        self
    }

    pub fn interval_secs(mut self, secs: u64) -> Self {
        self.config.monitor.interval_secs = Some(secs);
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
