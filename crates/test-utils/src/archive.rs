use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

use anyhow::{Context, Result};
use zip::ZipArchive;

/// Every entry of a ZIP stream, name → content.
pub fn read_entries<R: Read + Seek>(reader: R) -> Result<BTreeMap<String, Vec<u8>>> {
    let mut archive = ZipArchive::new(reader).context("opening zip")?;
    let mut entries = BTreeMap::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;
        let mut content = Vec::new();
        file.read_to_end(&mut content)?;
        entries.insert(file.name().to_string(), content);
    }
    Ok(entries)
}

/// Every entry of the ZIP file at `path`, name → content.
pub fn read_archive(path: &Path) -> Result<BTreeMap<String, Vec<u8>>> {
    let file = File::open(path).with_context(|| format!("opening {:?}", path))?;
    read_entries(file)
}

/// Entry names in the order they appear in the central directory.
pub fn entry_order(path: &Path) -> Result<Vec<String>> {
    let file = File::open(path).with_context(|| format!("opening {:?}", path))?;
    let mut archive = ZipArchive::new(file)?;
    let mut names = Vec::with_capacity(archive.len());
    for i in 0..archive.len() {
        names.push(archive.by_index(i)?.name().to_string());
    }
    Ok(names)
}
