//! Advisory file locking for the JSON store
//!
//! Several processes may point at the same data directory. Every
//! read-modify-write of the store file happens under an exclusive lock on a
//! sidecar lock file; snapshot reads take a shared lock.

use anyhow::{Context, Result};
use fs4::fs_std::FileExt as Fs4FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::time::{Duration, Instant};

/// Lock guard that releases the lock when dropped
#[derive(Debug)]
pub struct LockGuard {
    file: File,
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        let _ = Fs4FileExt::unlock(&self.file);
    }
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Shared,
    Exclusive,
}

/// Acquires advisory locks with a bounded wait
///
/// Uses flock on Unix and LockFileEx on Windows. Locks are released when
/// the returned [`LockGuard`] is dropped, including on panic.
///
/// # Examples
///
/// ```no_run
/// use issuable::storage::FileLocker;
/// use std::path::Path;
/// use std::time::Duration;
///
/// let locker = FileLocker::new(Duration::from_secs(5));
/// let guard = locker.lock_exclusive(Path::new("data/store.lock")).unwrap();
/// // ... read, modify, write ...
/// drop(guard);
/// ```
#[derive(Debug, Clone)]
pub struct FileLocker {
    timeout: Duration,
}

impl FileLocker {
    /// Create a locker that gives up after `timeout`
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Acquire an exclusive (write) lock, blocking up to the timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock file cannot be opened or the lock is not
    /// acquired within the timeout.
    pub fn lock_exclusive(&self, path: &Path) -> Result<LockGuard> {
        self.acquire(path, Mode::Exclusive)
    }

    /// Acquire a shared (read) lock, blocking up to the timeout.
    ///
    /// # Errors
    ///
    /// Same as [`FileLocker::lock_exclusive`].
    pub fn lock_shared(&self, path: &Path) -> Result<LockGuard> {
        self.acquire(path, Mode::Shared)
    }

    fn acquire(&self, path: &Path, mode: Mode) -> Result<LockGuard> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .with_context(|| format!("Failed to open lock file: {}", path.display()))?;

        let start = Instant::now();
        let poll_interval = Duration::from_millis(10);

        loop {
            let attempt = match mode {
                Mode::Shared => Fs4FileExt::try_lock_shared(&file),
                Mode::Exclusive => Fs4FileExt::try_lock_exclusive(&file),
            };
            match attempt {
                Ok(true) => return Ok(LockGuard { file }),
                Ok(false) => {
                    if start.elapsed() >= self.timeout {
                        anyhow::bail!(
                            "Lock timeout: could not acquire {:?} lock on {} after {:?}",
                            mode,
                            path.display(),
                            self.timeout
                        );
                    }
                    std::thread::sleep(poll_interval);
                }
                Err(e) => {
                    anyhow::bail!("IO error while trying to lock {}: {}", path.display(), e);
                }
            }
        }
    }
}
