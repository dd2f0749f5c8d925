// src/fs/mock.rs

use super::{FileFingerprint, FileSystem};
use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, SystemTime};

#[derive(Debug, Clone)]
struct MockFile {
    content: Vec<u8>,
    modified: SystemTime,
}

#[derive(Debug, Default)]
struct MockState {
    files: HashMap<PathBuf, MockFile>,
    locked: Vec<PathBuf>,
    reads: HashMap<PathBuf, usize>,
    read_delay: Option<Duration>,
}

/// In-memory filesystem for tests.
///
/// Besides plain files it can simulate files held under an exclusive lock
/// (`lock_file`), slow reads (`set_read_delay`), and it counts how often each
/// file was opened for reading (`read_count`). Lookups are case-sensitive.
#[derive(Debug, Clone, Default)]
pub struct MockFileSystem {
    state: Arc<Mutex<MockState>>,
}

impl MockFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Create or overwrite a file.
    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        let path = path.as_ref().to_path_buf();
        let mut state = self.state();
        // Each write moves the mtime forward so metadata checks see a change.
        let modified = match state.files.get(&path) {
            Some(file) => file.modified + Duration::from_secs(1),
            None => SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000),
        };
        state.files.insert(
            path,
            MockFile {
                content: content.into(),
                modified,
            },
        );
    }

    pub fn remove_file(&self, path: impl AsRef<Path>) {
        self.state().files.remove(path.as_ref());
    }

    /// Make subsequent opens of `path` fail as if another process held it.
    pub fn lock_file(&self, path: impl AsRef<Path>) {
        self.state().locked.push(path.as_ref().to_path_buf());
    }

    pub fn unlock_file(&self, path: impl AsRef<Path>) {
        let path = path.as_ref();
        self.state().locked.retain(|p| p != path);
    }

    /// Sleep this long inside every `open_read`.
    pub fn set_read_delay(&self, delay: Duration) {
        self.state().read_delay = Some(delay);
    }

    /// Number of times `path` was opened for reading.
    pub fn read_count(&self, path: impl AsRef<Path>) -> usize {
        self.state().reads.get(path.as_ref()).copied().unwrap_or(0)
    }
}

impl FileSystem for MockFileSystem {
    fn open_read(&self, path: &Path) -> Result<Box<dyn Read + Send>> {
        let (content, delay) = {
            let mut state = self.state();
            *state.reads.entry(path.to_path_buf()).or_insert(0) += 1;
            if state.locked.iter().any(|p| p == path) {
                return Err(anyhow!("file is locked by another process: {:?}", path));
            }
            let content = match state.files.get(path) {
                Some(file) => file.content.clone(),
                None => return Err(anyhow!("File not found: {:?}", path)),
            };
            (content, state.read_delay)
        };

        // Sleep outside the state lock so concurrent readers overlap.
        if let Some(delay) = delay {
            std::thread::sleep(delay);
        }
        Ok(Box::new(Cursor::new(content)))
    }

    fn is_file(&self, path: &Path) -> bool {
        self.state().files.contains_key(path)
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf> {
        // Identity, so `/www/Site.css` and `/www/SITE.CSS` stay distinct
        // paths and only the key policy can make them share an entry.
        Ok(path.to_path_buf())
    }

    fn fingerprint(&self, path: &Path) -> Result<FileFingerprint> {
        match self.state().files.get(path) {
            Some(file) => Ok(FileFingerprint {
                len: file.content.len() as u64,
                modified: Some(file.modified),
            }),
            None => Err(anyhow!("File not found: {:?}", path)),
        }
    }
}
