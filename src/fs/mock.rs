// src/fs/mock.rs

use super::{FileSystem, FileWriter};
use std::collections::BTreeMap;
use std::io::{self, Cursor, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone)]
pub enum MockEntry {
    File { content: Vec<u8>, modified: SystemTime },
    Dir,
}

#[derive(Debug, Default)]
struct MockState {
    entries: BTreeMap<PathBuf, MockEntry>,
    /// Logical clock in whole seconds; every write advances it.
    clock: u64,
}

/// In-memory filesystem.
///
/// Clones share the same tree, so a test can keep one handle to mutate files
/// while the code under test reads through another. Modification times come
/// from a logical clock, which makes every write observable by mtime.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

fn lock_state(state: &Mutex<MockState>) -> MutexGuard<'_, MockState> {
    // A panicking test must not poison every other handle.
    state.lock().unwrap_or_else(|e| e.into_inner())
}

impl MockState {
    fn tick(&mut self) -> SystemTime {
        self.clock += 1;
        UNIX_EPOCH + Duration::from_secs(self.clock)
    }

    fn parent_is_dir(&self, path: &Path) -> bool {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                matches!(self.entries.get(parent), Some(MockEntry::Dir))
            }
            _ => true,
        }
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, format!("not found: {:?}", path))
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        lock_state(&self.state)
    }

    /// Create or overwrite a file, creating parent directories implicitly.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.lock();
        let modified = state.tick();
        for ancestor in path.ancestors().skip(1) {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            state
                .entries
                .entry(ancestor.to_path_buf())
                .or_insert(MockEntry::Dir);
        }
        state.entries.insert(
            path,
            MockEntry::File {
                content: content.into(),
                modified,
            },
        );
    }

    pub fn add_dir(&self, path: impl AsRef<Path>) {
        let mut state = self.lock();
        for ancestor in path.as_ref().ancestors() {
            if ancestor.as_os_str().is_empty() {
                continue;
            }
            state
                .entries
                .entry(ancestor.to_path_buf())
                .or_insert(MockEntry::Dir);
        }
    }

    /// Advance the modification time of an existing file without touching
    /// its content.
    pub fn touch(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let path = path.as_ref();
        let mut state = self.lock();
        let now = state.tick();
        match state.entries.get_mut(path) {
            Some(MockEntry::File { modified, .. }) => {
                *modified = now;
                Ok(())
            }
            _ => Err(not_found(path)),
        }
    }

    /// Pin the modification time of an existing file.
    pub fn set_modified(&self, path: impl AsRef<Path>, time: SystemTime) -> io::Result<()> {
        let path = path.as_ref();
        let mut state = self.lock();
        match state.entries.get_mut(path) {
            Some(MockEntry::File { modified, .. }) => {
                *modified = time;
                Ok(())
            }
            _ => Err(not_found(path)),
        }
    }

    /// Remove a file, or a directory together with everything below it.
    pub fn remove(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let mut state = self.lock();
        state.entries.retain(|p, _| !p.starts_with(path));
    }
}

impl FileSystem for MockFileSystem {
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        let state = self.lock();
        match state.entries.get(path) {
            Some(MockEntry::File { content, .. }) => Ok(Box::new(Cursor::new(content.clone()))),
            Some(MockEntry::Dir) => Err(io::Error::other(format!("is a directory: {:?}", path))),
            None => Err(not_found(path)),
        }
    }

    fn create(&self, path: &Path) -> io::Result<Box<dyn FileWriter>> {
        let mut state = self.lock();
        if !state.parent_is_dir(path) {
            return Err(not_found(path));
        }
        if matches!(state.entries.get(path), Some(MockEntry::Dir)) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {:?}", path),
            ));
        }
        let modified = state.tick();
        state.entries.insert(
            path.to_path_buf(),
            MockEntry::File {
                content: Vec::new(),
                modified,
            },
        );

        Ok(Box::new(MockWriter {
            state: Arc::clone(&self.state),
            path: path.to_path_buf(),
            buf: Cursor::new(Vec::new()),
            dirty: false,
        }))
    }

    fn create_dir_all(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        let mut ancestors: Vec<&Path> = path
            .ancestors()
            .filter(|a| !a.as_os_str().is_empty())
            .collect();
        ancestors.reverse();
        for ancestor in ancestors {
            match state.entries.get(ancestor) {
                Some(MockEntry::Dir) => {}
                Some(MockEntry::File { .. }) => {
                    return Err(io::Error::new(
                        io::ErrorKind::NotADirectory,
                        format!("not a directory: {:?}", ancestor),
                    ));
                }
                None => {
                    state.entries.insert(ancestor.to_path_buf(), MockEntry::Dir);
                }
            }
        }
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        let mut state = self.lock();
        if !matches!(state.entries.get(from), Some(MockEntry::File { .. })) {
            return Err(not_found(from));
        }
        if !state.parent_is_dir(to) {
            return Err(not_found(to));
        }
        if matches!(state.entries.get(to), Some(MockEntry::Dir)) {
            return Err(io::Error::new(
                io::ErrorKind::IsADirectory,
                format!("is a directory: {:?}", to),
            ));
        }
        // Renaming keeps the modification time, as on a real disk.
        if let Some(entry) = state.entries.remove(from) {
            state.entries.insert(to.to_path_buf(), entry);
        }
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        let mut state = self.lock();
        match state.entries.get(path) {
            Some(MockEntry::File { .. }) => {
                state.entries.remove(path);
                Ok(())
            }
            _ => Err(not_found(path)),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        self.lock().entries.contains_key(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        matches!(self.lock().entries.get(path), Some(MockEntry::Dir))
    }

    fn canonicalize(&self, path: &Path) -> io::Result<PathBuf> {
        // Tests use absolute paths, so existing paths are already canonical.
        if self.exists(path) {
            Ok(path.to_path_buf())
        } else {
            Err(not_found(path))
        }
    }

    fn modified(&self, path: &Path) -> io::Result<SystemTime> {
        match self.lock().entries.get(path) {
            Some(MockEntry::File { modified, .. }) => Ok(*modified),
            Some(MockEntry::Dir) => Ok(UNIX_EPOCH),
            None => Err(not_found(path)),
        }
    }

    fn len(&self, path: &Path) -> io::Result<u64> {
        match self.lock().entries.get(path) {
            Some(MockEntry::File { content, .. }) => Ok(content.len() as u64),
            Some(MockEntry::Dir) => Ok(0),
            None => Err(not_found(path)),
        }
    }

    fn walk_files(&self, root: &Path) -> io::Result<Vec<PathBuf>> {
        let state = self.lock();
        match state.entries.get(root) {
            Some(MockEntry::Dir) => {}
            Some(MockEntry::File { .. }) => return Ok(vec![root.to_path_buf()]),
            None => return Err(not_found(root)),
        }
        Ok(state
            .entries
            .iter()
            .filter(|(p, e)| p.starts_with(root) && matches!(e, MockEntry::File { .. }))
            .map(|(p, _)| p.clone())
            .collect())
    }
}

/// Write handle into a [`MockFileSystem`].
///
/// Bytes are buffered and land in the tree on [`FileWriter::sync`] or when the
/// handle is dropped, each landing counting as one write for the clock.
#[derive(Debug)]
pub struct MockWriter {
    state: Arc<Mutex<MockState>>,
    path: PathBuf,
    buf: Cursor<Vec<u8>>,
    dirty: bool,
}

impl MockWriter {
    fn commit(&mut self) {
        if !self.dirty {
            return;
        }
        let mut state = lock_state(&self.state);
        let modified = state.tick();
        state.entries.insert(
            self.path.clone(),
            MockEntry::File {
                content: self.buf.get_ref().clone(),
                modified,
            },
        );
        self.dirty = false;
    }
}

impl Write for MockWriter {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.dirty = true;
        self.buf.write(data)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Seek for MockWriter {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.buf.seek(pos)
    }
}

impl FileWriter for MockWriter {
    fn sync(&mut self) -> io::Result<()> {
        self.commit();
        Ok(())
    }
}

impl Drop for MockWriter {
    fn drop(&mut self) {
        self.commit();
    }
}
