// src/fs/mod.rs

//! Filesystem abstraction shared by the archiver and the monitor.
//!
//! The real implementation walks the disk with `walkdir`; the mock keeps an
//! in-memory tree with explicit modification times so change detection and
//! archive writes can be exercised without touching the disk.

use std::fmt::Debug;
use std::fs;
use std::io::{self, BufWriter, Read, Seek, Write};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use walkdir::WalkDir;

pub mod mock;

/// Writable, seekable handle returned by [`FileSystem::create`].
pub trait FileWriter: Write + Seek + Send {
    /// Flush buffered data and persist it.
    fn sync(&mut self) -> io::Result<()>;
}

impl FileWriter for BufWriter<fs::File> {
    fn sync(&mut self) -> io::Result<()> {
        self.flush()?;
        self.get_ref().sync_all()
    }
}

/// Abstract filesystem interface.
pub trait FileSystem: Send + Sync + Debug {
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;

    /// Create or truncate `path` for writing. The parent must exist.
    fn create(&self, path: &Path) -> io::Result<Box<dyn FileWriter>>;
    fn create_dir_all(&self, path: &Path) -> io::Result<()>;
    /// Move `from` over `to`, replacing any existing file.
    fn rename(&self, from: &Path, to: &Path) -> io::Result<()>;
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    fn exists(&self, path: &Path) -> bool;
    fn is_dir(&self, path: &Path) -> bool;
    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf>;
    fn modified(&self, path: &Path) -> io::Result<SystemTime>;
    fn len(&self, path: &Path) -> io::Result<u64>;

    /// Every regular file below `root`, recursively, sorted by path.
    ///
    /// Returns full paths. Symlinks are not followed.
    fn walk_files(&self, root: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Implementation that uses `std::fs` and `walkdir`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        let file = fs::File::open(path)?;
        Ok(Box::new(file))
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn FileWriter>> {
        let file = fs::File::create(path)?;
        Ok(Box::new(BufWriter::new(file)))
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        fs::create_dir_all(path)
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        fs::rename(from, to)
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        fs::canonicalize(path)
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        fs::metadata(path)?.modified()
    }

    fn len(&self, path: &Path) -> io::Result<u64> {
        Ok(fs::metadata(path)?.len())
    }

    fn walk_files(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
        {
            let entry = entry?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }
}
