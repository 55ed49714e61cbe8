//! Filesystem durable store: one file per key inside a directory

use super::{check_quota, DurableStore};
use acordes_common::{Error, Result};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::debug;
use uuid::Uuid;

const EXTENSION: &str = "json";

/// Directory-backed store
///
/// Writes go to a uniquely named temp file which is synced and renamed over
/// the target, so readers in other processes see either the old or the new
/// document, never a torn one.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
    capacity: Option<usize>,
}

impl FileStore {
    /// Open (creating if needed) a store rooted at `dir`
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        debug!("File store opened at {}", dir.display());
        Ok(Self { dir, capacity: None })
    }

    /// Limit total usage to `capacity` bytes
    pub fn with_capacity(mut self, capacity: Option<usize>) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && !key.starts_with('.')
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(Error::InvalidInput(format!("invalid store key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.{}", key, EXTENSION)))
    }

    /// (key, size in bytes) of every stored entry
    fn entries(&self) -> Result<Vec<(String, usize)>> {
        let mut entries = Vec::new();
        for item in fs::read_dir(&self.dir)? {
            let item = item?;
            let path = item.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let Some(key) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if key.starts_with('.') {
                continue;
            }
            let size = item.metadata()?.len() as usize;
            entries.push((key.to_string(), size));
        }
        Ok(entries)
    }
}

impl DurableStore for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;

        if self.capacity.is_some() {
            let used_by_others: usize = self
                .entries()?
                .into_iter()
                .filter(|(k, _)| k != key)
                .map(|(k, size)| k.len() + size)
                .sum();
            check_quota(key, value, used_by_others, self.capacity)?;
        }

        let temp_path = self.dir.join(format!(".{}.{}.tmp", key, Uuid::new_v4()));
        let written = (|| -> std::io::Result<()> {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(value.as_bytes())?;
            file.sync_all()?;
            fs::rename(&temp_path, &path)
        })();

        if let Err(e) = written {
            let _ = fs::remove_file(&temp_path);
            return Err(e.into());
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn used_bytes(&self) -> Result<usize> {
        Ok(self.entries()?.into_iter().map(|(k, size)| k.len() + size).sum())
    }

    fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}
