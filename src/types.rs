use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use zip::CompressionMethod;

/// Compression applied to every archive entry.
///
/// - `Deflated`: standard ZIP deflate (default, what `jar` tools expect).
/// - `Stored`: no compression; entries are copied verbatim.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    #[default]
    Deflated,
    Stored,
}

impl Compression {
    pub fn method(self) -> CompressionMethod {
        match self {
            Compression::Deflated => CompressionMethod::Deflated,
            Compression::Stored => CompressionMethod::Stored,
        }
    }
}

impl FromStr for Compression {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deflated" | "deflate" => Ok(Compression::Deflated),
            "stored" | "store" => Ok(Compression::Stored),
            other => Err(format!(
                "invalid compression: {other} (expected \"deflated\" or \"stored\")"
            )),
        }
    }
}

/// Lifecycle state of the change monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorState {
    /// Holding the last-known snapshot, waiting for the next poll.
    Idle,
    /// An archive rebuild is in progress.
    Rebuilding,
    /// Cancelled from outside. Terminal.
    Stopped,
}

impl fmt::Display for MonitorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonitorState::Idle => write!(f, "idle"),
            MonitorState::Rebuilding => write!(f, "rebuilding"),
            MonitorState::Stopped => write!(f, "stopped"),
        }
    }
}
