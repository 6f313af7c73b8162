mod common;
use crate::common::builders::ConfigFileBuilder;

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::{tempdir, TempDir};

use jarsync::config::{load_and_validate, load_from_path, load_optional, ConfigFile};
use jarsync::errors::JarsyncError;
use jarsync::types::Compression;

type TestResult = Result<(), Box<dyn Error>>;

fn write_config(contents: &str) -> (TempDir, PathBuf) {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("Jarsync.toml");
    fs::write(&path, contents).expect("write config");
    (dir, path)
}

#[test]
fn full_config_is_loaded_and_validated() -> TestResult {
    let (_dir, path) = write_config(
        r#"
[archive]
source = "app"
output = "dist/app.jar"
compression = "stored"
exclude = ["**/*.tmp", "build/**"]
allow_nested_output = true
atomic = false

[monitor]
watch = true
interval_secs = 2
"#,
    );

    let cfg = load_and_validate(&path)?;

    assert_eq!(cfg.archive.source.as_deref(), Some("app"));
    assert_eq!(cfg.archive.output.as_deref(), Some("dist/app.jar"));
    assert_eq!(cfg.archive.compression, Compression::Stored);
    assert!(cfg.archive.allow_nested_output);
    assert!(!cfg.archive.atomic);
    assert_eq!(cfg.monitor.watch, Some(true));
    assert_eq!(cfg.monitor.interval_secs, Some(2));

    assert_eq!(cfg.exclude().patterns(), ["**/*.tmp", "build/**"]);
    assert!(cfg.exclude().is_excluded("notes.tmp"));
    assert!(cfg.exclude().is_excluded("build/out/Main.class"));
    assert!(!cfg.exclude().is_excluded("src/Main.java"));
    Ok(())
}

#[test]
fn empty_file_takes_every_default() -> TestResult {
    let (_dir, path) = write_config("");
    let cfg = load_and_validate(&path)?;

    assert!(cfg.archive.source.is_none());
    assert!(cfg.archive.output.is_none());
    assert_eq!(cfg.archive.compression, Compression::Deflated);
    assert!(cfg.archive.exclude.is_empty());
    assert!(!cfg.archive.allow_nested_output);
    assert!(cfg.archive.atomic);
    assert!(cfg.monitor.watch.is_none());
    assert!(cfg.monitor.interval_secs.is_none());
    Ok(())
}

#[test]
fn zero_interval_is_a_config_error() {
    let (_dir, path) = write_config("[monitor]\ninterval_secs = 0\n");
    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, JarsyncError::ConfigError(ref msg) if msg.contains("interval_secs")));
}

#[test]
fn invalid_glob_is_a_config_error() {
    let (_dir, path) = write_config("[archive]\nexclude = [\"src/[\"]\n");
    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, JarsyncError::ConfigError(_)), "got {err:?}");
}

#[test]
fn blank_source_is_a_config_error() {
    let (_dir, path) = write_config("[archive]\nsource = \"  \"\n");
    let err = load_and_validate(&path).unwrap_err();
    assert!(matches!(err, JarsyncError::ConfigError(ref msg) if msg.contains("source")));
}

#[test]
fn unknown_compression_is_a_toml_error() {
    let (_dir, path) = write_config("[archive]\ncompression = \"zstd\"\n");
    let err = load_from_path(&path).unwrap_err();
    assert!(matches!(err, JarsyncError::TomlError(_)), "got {err:?}");
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let (_dir, path) = write_config("[archive\nsource = ");
    assert!(matches!(
        load_from_path(&path).unwrap_err(),
        JarsyncError::TomlError(_)
    ));
}

#[test]
fn missing_explicit_config_is_an_error() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("nope.toml");
    let err = load_optional(Some(missing.as_path())).unwrap_err();
    assert!(matches!(err, JarsyncError::ConfigError(ref msg) if msg.contains("nope.toml")));
}

#[test]
fn explicit_config_is_used() -> TestResult {
    let (_dir, path) = write_config("[archive]\nsource = \"web\"\n");
    let cfg = load_optional(Some(Path::new(&path)))?;
    assert_eq!(cfg.archive.source.as_deref(), Some("web"));
    Ok(())
}

#[test]
fn default_config_file_has_no_surprises() {
    let cfg = ConfigFile::default();
    assert!(cfg.archive.atomic);
    assert!(cfg.exclude().patterns().is_empty());
    assert!(!cfg.exclude().is_excluded("anything"));
}

#[test]
fn builder_matches_parsed_file() -> TestResult {
    let (_dir, path) = write_config(
        "[archive]\nsource = \"app\"\nexclude = [\"*.log\"]\n[monitor]\nwatch = false\n",
    );
    let parsed = load_and_validate(&path)?;
    let built = ConfigFileBuilder::new()
        .source("app")
        .exclude("*.log")
        .watch(false)
        .build();

    assert_eq!(parsed.archive.source, built.archive.source);
    assert_eq!(parsed.exclude().patterns(), built.exclude().patterns());
    assert_eq!(parsed.monitor.watch, built.monitor.watch);
    Ok(())
}
