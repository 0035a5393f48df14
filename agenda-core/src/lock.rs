//! Exclusive ownership of a data directory.
//!
//! A [`crate::store::FileStore`] assumes it is the only writer of its
//! document, so every process that writes takes this lock first.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::error::{AgendaError, AgendaResult};

const LOCK_FILE: &str = "agenda.lock";

/// Releases the lock when dropped.
pub struct DataDirLock {
    _file: File,
    path: PathBuf,
}

impl DataDirLock {
    /// Acquire the lock, failing if another process holds it.
    pub fn acquire(data_dir: &Path) -> AgendaResult<Self> {
        fs::create_dir_all(data_dir)?;
        let path = data_dir.join(LOCK_FILE);
        let file = File::create(&path)?;

        file.try_lock_exclusive().map_err(|_| {
            AgendaError::Store(format!(
                "Another agenda process is using {}.\n\
                If you believe this is an error, remove: {}",
                data_dir.display(),
                path.display()
            ))
        })?;

        Ok(DataDirLock { _file: file, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_lock_fails_until_first_dropped() {
        let dir = tempfile::tempdir().unwrap();

        let first = DataDirLock::acquire(dir.path()).unwrap();
        assert!(DataDirLock::acquire(dir.path()).is_err());

        drop(first);
        assert!(DataDirLock::acquire(dir.path()).is_ok());
    }
}
