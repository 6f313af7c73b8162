// src/config/mod.rs

//! Configuration for jarsync.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load an optional config file from disk (`loader.rs`).
//! - Validate it (`validate.rs`).
//! - Merge CLI flags, config values and interactive answers into the final
//!   [`Settings`] (`resolve.rs`).

pub mod loader;
pub mod model;
pub mod resolve;
pub mod validate;

pub use loader::{default_config_path, load_and_validate, load_from_path, load_optional};
pub use model::{ArchiveSection, ConfigFile, MonitorSection, RawConfigFile};
pub use resolve::{resolve_settings, Settings};
