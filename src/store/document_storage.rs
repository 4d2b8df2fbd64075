use std::collections::HashMap;
use std::fs;
use std::io;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage quota of {quota} bytes exceeded ({needed} bytes needed)")]
    QuotaExceeded { quota: u64, needed: u64 },
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Key/value string storage holding whole documents, in the manner of a
/// browser's local storage.
pub trait DocumentStorage: Send + Sync {
    fn get_item(&self, key: &str) -> io::Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

fn check_quota(quota: Option<u64>, value: &str) -> Result<(), StorageError> {
    let needed = value.len() as u64;
    match quota {
        Some(quota) if needed > quota => Err(StorageError::QuotaExceeded { quota, needed }),
        _ => Ok(()),
    }
}

/// One `<key>.json` file per key inside `root_dir`
pub struct FileStorage {
    root_dir: PathBuf,
    quota_bytes: u64,
}

impl FileStorage {
    pub fn new(root_dir: PathBuf, quota_bytes: u64) -> Self {
        FileStorage {
            root_dir,
            quota_bytes,
        }
    }

    fn key_path(&self, key: &str) -> io::Result<PathBuf> {
        let valid = !key.is_empty() && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(io::Error::new(ErrorKind::InvalidInput, format!("Invalid storage key: {}", key)));
        }
        Ok(self.root_dir.join(format!("{}.json", key)))
    }
}

impl DocumentStorage for FileStorage {
    fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        let path = self.key_path(key)?;
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(Some(self.quota_bytes), value)?;

        let path = self.key_path(key)?;
        fs::create_dir_all(&self.root_dir)?;

        // Replace the document in one step, readers never see a partial file
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
    quota_bytes: Option<u64>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_quota(quota_bytes: u64) -> Self {
        MemoryStorage {
            items: Default::default(),
            quota_bytes: Some(quota_bytes),
        }
    }

    fn lock(&self) -> io::Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.items.lock()
            .map_err(|_| io::Error::new(ErrorKind::Other, "Memory storage lock poisoned"))
    }
}

impl DocumentStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> io::Result<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        check_quota(self.quota_bytes, value)?;
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_file_storage_round_trip() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().join("data"), 1024);

        assert_eq!(storage.get_item("blogData").unwrap(), None);
        storage.set_item("blogData", r#"{"blogs":[]}"#).unwrap();
        assert_eq!(storage.get_item("blogData").unwrap().as_deref(), Some(r#"{"blogs":[]}"#));
        assert!(dir.path().join("data").join("blogData.json").exists());
        assert!(!dir.path().join("data").join("blogData.json.tmp").exists());
    }

    #[test]
    fn test_file_storage_quota() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf(), 4);

        let err = storage.set_item("blogData", "12345").err().unwrap();
        assert!(matches!(err, StorageError::QuotaExceeded { quota: 4, needed: 5 }));
        assert_eq!(storage.get_item("blogData").unwrap(), None);
    }

    #[test]
    fn test_file_storage_rejects_bad_key() {
        let dir = tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf(), 1024);
        assert!(storage.get_item("../etc/passwd").is_err());
        assert!(matches!(storage.set_item("", "x"), Err(StorageError::Io(_))));
    }

    #[test]
    fn test_memory_storage_quota() {
        let storage = MemoryStorage::with_quota(3);
        storage.set_item("k", "abc").unwrap();
        assert!(matches!(storage.set_item("k", "abcd"), Err(StorageError::QuotaExceeded { .. })));
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("abc"));
    }
}
