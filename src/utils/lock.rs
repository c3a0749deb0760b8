//! Exclusive file locking for read-modify-write edits.
//!
//! Env files are merged in place: the file is opened, locked with an exclusive `fs4`
//! lock, read, rewritten through the same handle and unlocked on drop. Two merges into
//! the same file, from this process or another one, are serialized.

use anyhow::{Context, Result};
use fs4::fs_std::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// A file held under an exclusive lock.
///
/// The lock is released when the value is dropped.
pub struct LockedFile {
    file: File,
    path: PathBuf,
}

impl LockedFile {
    /// Open (creating if needed) and exclusively lock `path`.
    ///
    /// Lock acquisition blocks, so it runs on tokio's blocking pool.
    pub async fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let lock_path = path.to_path_buf();
        let file = tokio::task::spawn_blocking(move || -> Result<File> {
            let file = OpenOptions::new()
                .create(true)
                .truncate(false)
                .read(true)
                .write(true)
                .open(&lock_path)
                .with_context(|| format!("Failed to open file: {}", lock_path.display()))?;

            file.lock_exclusive()
                .with_context(|| format!("Failed to acquire lock for: {}", lock_path.display()))?;

            Ok(file)
        })
        .await
        .context("Failed to spawn blocking task for lock acquisition")??;

        tracing::debug!("Locked {}", path.display());

        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the whole file from the start.
    pub fn read_to_string(&mut self) -> Result<String> {
        let mut content = String::new();
        self.file.seek(SeekFrom::Start(0))?;
        self.file
            .read_to_string(&mut content)
            .with_context(|| format!("Failed to read file: {}", self.path.display()))?;
        Ok(content)
    }

    /// Replace the whole file with `content` and sync it.
    pub fn replace_contents(&mut self, content: &str) -> Result<()> {
        self.file.seek(SeekFrom::Start(0))?;
        self.file.set_len(0)?;
        self.file
            .write_all(content.as_bytes())
            .with_context(|| format!("Failed to write file: {}", self.path.display()))?;
        self.file.sync_all().context("Failed to sync file to disk")?;
        Ok(())
    }
}

impl Drop for LockedFile {
    fn drop(&mut self) {
        #[allow(unstable_name_collisions)]
        if let Err(e) = self.file.unlock() {
            tracing::warn!("Failed to unlock {}: {}", self.path.display(), e);
        }
    }
}
