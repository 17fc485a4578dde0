//! Persistent Storage Module
//!
//! Directory-backed medium that survives process restarts. Each key is one
//! file. Short keys are named after the hex encoding of the key; keys too long
//! for a file name are named after their SHA-256 digest, with the key text kept
//! in a sidecar file so it can still be listed.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::{Result, ShelfError};
use crate::storage::StorageMedium;

const VALUE_EXTENSION: &str = "json";
const KEY_EXTENSION: &str = "key";
const TEMP_EXTENSION: &str = "tmp";

const HEX_PREFIX: &str = "k-";
const DIGEST_PREFIX: &str = "d-";

/// Longest key (in bytes) stored under its hex name. Keeps file names well
/// under the common 255-byte limit.
const MAX_HEX_KEY_BYTES: usize = 100;

// == File Storage ==
/// Persistent medium rooted at a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    // == Constructor ==
    /// Opens (creating if needed) the storage directory at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root).map_err(|e| {
            ShelfError::Storage(format!(
                "failed to create storage directory {}: {}",
                root.display(),
                e
            ))
        })?;
        info!("Persistent storage opened at {}", root.display());
        Ok(Self { root })
    }

    /// Returns the storage directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn is_digest_key(key: &str) -> bool {
        key.len() > MAX_HEX_KEY_BYTES
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name = if Self::is_digest_key(key) {
            format!("{}{}", DIGEST_PREFIX, hex::encode(Sha256::digest(key.as_bytes())))
        } else {
            format!("{}{}", HEX_PREFIX, hex::encode(key.as_bytes()))
        };
        self.root.join(format!("{}.{}", name, VALUE_EXTENSION))
    }

    fn key_from_path(path: &Path) -> Option<String> {
        if path.extension()? != VALUE_EXTENSION {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        if let Some(encoded) = stem.strip_prefix(HEX_PREFIX) {
            let bytes = hex::decode(encoded).ok()?;
            return String::from_utf8(bytes).ok();
        }
        if stem.starts_with(DIGEST_PREFIX) {
            return fs::read_to_string(path.with_extension(KEY_EXTENSION)).ok();
        }
        None
    }
}

/// Writes `content` next to `path` and renames it into place.
///
/// The temp file is removed again when the rename fails.
fn write_atomic(key: &str, path: &Path, content: &str) -> Result<()> {
    let temp_path = path.with_extension(TEMP_EXTENSION);

    fs::write(&temp_path, content).map_err(|e| ShelfError::io(key, e))?;
    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(ShelfError::io(key, e));
    }

    Ok(())
}

fn remove_if_present(key: &str, path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(ShelfError::io(key, e)),
    }
}

impl StorageMedium for FileStorage {
    fn name(&self) -> &'static str {
        "file"
    }

    fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ShelfError::io(key, e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        if Self::is_digest_key(key) {
            write_atomic(key, &path.with_extension(KEY_EXTENSION), key)?;
        }
        write_atomic(key, &path, value)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        remove_if_present(key, &path)?;
        if Self::is_digest_key(key) {
            remove_if_present(key, &path.with_extension(KEY_EXTENSION))?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        let dir = fs::read_dir(&self.root).map_err(|e| {
            ShelfError::Storage(format!("failed to list {}: {}", self.root.display(), e))
        })?;

        let mut keys = Vec::new();
        for entry in dir {
            let entry = entry.map_err(|e| ShelfError::Storage(e.to_string()))?;
            if let Some(key) = Self::key_from_path(&entry.path()) {
                keys.push(key);
            }
        }
        Ok(keys)
    }

    fn clear(&self) -> Result<()> {
        for key in self.keys()? {
            self.remove(&key)?;
        }
        Ok(())
    }
}
