// lock.rs - single-writer scheme lock (C9)

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

use crate::error::LinCodeError;

/// Holds the exclusive per-scheme lock for the lifetime of the value; the
/// lock file is removed on drop, including on an unwind from a fatal error.
pub struct SchemeLock {
    path: PathBuf,
}

impl SchemeLock {
    /// Acquire the lock for `(executable identity, dir, scheme_id)`. If a
    /// lock file already exists and its recorded PID is still alive, returns
    /// a `Contention` error the caller should report and exit 1 on. A stale
    /// lock (dead PID) is removed and acquisition retried once.
    pub fn acquire(locks_dir: &Path, dir: &Path, scheme_id: u32) -> Result<Self, LinCodeError> {
        fs::create_dir_all(locks_dir)
            .map_err(|e| LinCodeError::io(format!("creating lock directory '{}': {}", locks_dir.display(), e)))?;

        let name = stable_lock_name(dir, scheme_id);
        let path = locks_dir.join(name);

        if let Some(pid) = read_lock_pid(&path) {
            if is_process_alive(pid) {
                return Err(LinCodeError::contention(format!(
                    "already running: scheme {} in '{}' is locked by pid {}",
                    scheme_id,
                    dir.display(),
                    pid
                )));
            }
            fs::remove_file(&path).ok();
        }

        fs::write(&path, std::process::id().to_string())
            .map_err(|e| LinCodeError::io(format!("writing lock file '{}': {}", path.display(), e)))?;

        Ok(Self { path })
    }
}

impl Drop for SchemeLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn stable_lock_name(dir: &Path, scheme_id: u32) -> String {
    let mut hasher = DefaultHasher::new();
    env!("CARGO_PKG_NAME").hash(&mut hasher);
    dir.hash(&mut hasher);
    scheme_id.hash(&mut hasher);
    format!("{:016x}.lock", hasher.finish())
}

fn read_lock_pid(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}

#[cfg(unix)]
fn is_process_alive(pid: u32) -> bool {
    Path::new(&format!("/proc/{}", pid)).exists()
}

#[cfg(not(unix))]
fn is_process_alive(_pid: u32) -> bool {
    // Conservative: assume live on platforms with no /proc, so the
    // operator investigates rather than silently racing a real writer.
    true
}
