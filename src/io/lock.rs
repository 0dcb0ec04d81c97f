use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Lock file name inside `cellar/`
pub const LOCK_FILE: &str = ".lock";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
const RETRY_EVERY: Duration = Duration::from_millis(10);

/// Exclusive advisory lock on `cellar/.lock`, held while config.toml or
/// collection.toml is rewritten. The holder's pid is written into the file
/// so a waiting process can say who it is waiting on.
pub struct WriteLock {
    file: File,
    path: PathBuf,
}

#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("could not open lock file {path}: {source}")]
    Open { path: PathBuf, source: io::Error },
    #[error("could not lock {path}: {source}")]
    Flock { path: PathBuf, source: io::Error },
    #[error("timed out waiting for {path}: cellar process {holder} is writing")]
    Timeout { path: PathBuf, holder: String },
}

impl WriteLock {
    /// Take the lock, retrying until `timeout` runs out
    pub fn acquire(cellar_dir: &Path, timeout: Duration) -> Result<Self, LockError> {
        let path = cellar_dir.join(LOCK_FILE);
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(false)
            .open(&path)
            .map_err(|source| LockError::Open {
                path: path.clone(),
                source,
            })?;

        let deadline = Instant::now() + timeout;
        while !try_flock(&file).map_err(|source| LockError::Flock {
            path: path.clone(),
            source,
        })? {
            if Instant::now() >= deadline {
                let holder = read_holder(&mut file).unwrap_or_else(|| "unknown".to_string());
                return Err(LockError::Timeout { path, holder });
            }
            std::thread::sleep(RETRY_EVERY);
        }

        // Best effort: the pid is informational only
        if let Err(e) = write_holder(&mut file) {
            tracing::debug!(error = %e, "could not record lock holder");
        }
        tracing::trace!(path = %path.display(), "write lock taken");
        Ok(WriteLock { file, path })
    }

    pub fn acquire_default(cellar_dir: &Path) -> Result<Self, LockError> {
        Self::acquire(cellar_dir, DEFAULT_TIMEOUT)
    }
}

impl Drop for WriteLock {
    fn drop(&mut self) {
        // The flock goes away with the descriptor; clear the stale pid first
        let _ = self.file.set_len(0);
        tracing::trace!(path = %self.path.display(), "write lock released");
    }
}

fn read_holder(file: &mut File) -> Option<String> {
    let mut pid = String::new();
    file.seek(SeekFrom::Start(0)).ok()?;
    file.read_to_string(&mut pid).ok()?;
    let pid = pid.trim();
    (!pid.is_empty()).then(|| pid.to_string())
}

fn write_holder(file: &mut File) -> io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    write!(file, "{}", std::process::id())?;
    file.flush()
}

/// Non-blocking exclusive flock. `Ok(false)` means someone else holds it.
#[cfg(unix)]
fn try_flock(file: &File) -> io::Result<bool> {
    use std::os::unix::io::AsRawFd;
    let rc = unsafe { libc::flock(file.as_raw_fd(), libc::LOCK_EX | libc::LOCK_NB) };
    if rc == 0 {
        return Ok(true);
    }
    let err = io::Error::last_os_error();
    if err.kind() == io::ErrorKind::WouldBlock {
        Ok(false)
    } else {
        Err(err)
    }
}

#[cfg(not(unix))]
fn try_flock(_file: &File) -> io::Result<bool> {
    Ok(true)
}
