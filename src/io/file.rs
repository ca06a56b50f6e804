use super::{common, KeyValueStore, ReadError, WriteError};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{ErrorKind, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const LOCK_RETRY_INTERVAL: Duration = Duration::from_millis(100);

/// A key-value store keeping each key in its own JSON file under a root directory.
///
/// Locks are held only for the duration of a single read or write, so
/// several processes can share a data directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
    lock_timeout: Duration,
}

impl FileStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    ///
    /// Lock contention fails immediately.
    pub fn open(root: impl Into<PathBuf>) -> std::io::Result<Self> {
        Self::open_with_timeout(root, Duration::from_secs(0))
    }

    /// Open with a timeout for acquiring file locks.
    pub fn open_with_timeout(root: impl Into<PathBuf>, timeout: Duration) -> std::io::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            lock_timeout: timeout,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Option<PathBuf> {
        common::is_valid_key(key).then(|| self.root.join(format!("{key}.json")))
    }

    /// Retry `try_lock` until it succeeds or the configured timeout elapses.
    ///
    /// On failure yields the timeout that expired, or `None` when the store
    /// was opened without one.
    fn acquire(&self, try_lock: impl Fn() -> std::io::Result<()>) -> Result<(), Option<Duration>> {
        let start = Instant::now();

        loop {
            match try_lock() {
                Ok(()) => return Ok(()),
                Err(_) if self.lock_timeout.is_zero() => return Err(None),
                Err(_) if start.elapsed() >= self.lock_timeout => {
                    return Err(Some(self.lock_timeout))
                }
                Err(_) => std::thread::sleep(LOCK_RETRY_INTERVAL),
            }
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ReadError> {
        let path = self
            .path_for(key)
            .ok_or_else(|| ReadError::InvalidKey(key.to_string()))?;

        let mut file = match File::open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        self.acquire(|| FileExt::try_lock_shared(&file))
            .map_err(|timeout| match timeout {
                None => ReadError::AlreadyLocked,
                Some(t) => ReadError::LockTimeout(t),
            })?;

        let mut buffer = Vec::new();
        let result = file.read_to_end(&mut buffer);

        // Always release lock, even on error
        let _ = FileExt::unlock(&file);

        result?;
        Ok(Some(buffer))
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), WriteError> {
        let path = self
            .path_for(key)
            .ok_or_else(|| WriteError::InvalidKey(key.to_string()))?;

        // Not truncated on open: the lock must be held before the old contents go away.
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&path)?;

        self.acquire(|| file.try_lock_exclusive())
            .map_err(|timeout| match timeout {
                None => WriteError::AlreadyLocked,
                Some(t) => WriteError::LockTimeout(t),
            })?;

        let result = (|| {
            file.set_len(0)?;
            file.write_all(value)?;
            file.flush()?;
            file.sync_all()?;
            Ok(())
        })();

        let _ = FileExt::unlock(&file);

        result
    }

    fn remove(&self, key: &str) -> Result<(), WriteError> {
        let path = self
            .path_for(key)
            .ok_or_else(|| WriteError::InvalidKey(key.to_string()))?;

        match std::fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
