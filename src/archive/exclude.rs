// src/archive/exclude.rs

use std::fmt;

use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::errors::{JarsyncError, Result};

/// Compiled `exclude` glob patterns.
///
/// Patterns are matched against `/`-separated paths relative to the source
/// root (e.g. `"build/**"`, `"**/*.tmp"`). The same set filters both the
/// archive contents and the monitor's snapshot, so excluded files never
/// trigger a rebuild.
#[derive(Clone, Default)]
pub struct ExcludeSet {
    patterns: Vec<String>,
    set: Option<GlobSet>,
}

impl fmt::Debug for ExcludeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExcludeSet")
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl ExcludeSet {
    /// Compile a list of glob patterns. An empty list excludes nothing.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(Self::default());
        }

        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern).map_err(|e| {
                JarsyncError::ConfigError(format!("invalid exclude pattern '{pattern}': {e}"))
            })?;
            builder.add(glob);
        }
        let set = builder
            .build()
            .map_err(|e| JarsyncError::ConfigError(format!("building exclude set: {e}")))?;

        Ok(Self {
            patterns: patterns.iter().map(|p| p.as_ref().to_string()).collect(),
            set: Some(set),
        })
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Returns true if `rel_path` (relative, `/`-separated) is excluded.
    pub fn is_excluded(&self, rel_path: &str) -> bool {
        match &self.set {
            Some(set) => set.is_match(rel_path),
            None => false,
        }
    }
}
