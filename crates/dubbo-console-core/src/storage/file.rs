use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::debug;

use super::{KeyValueStorage, StorageError};

/// Storage file name in the data directory
const STORAGE_FILE: &str = "storage.json";

#[cfg(unix)]
const STORAGE_FILE_MODE: u32 = 0o600;

/// Key-value storage backed by one JSON object on disk.
///
/// Every write rewrites the whole file through a uniquely named temp file
/// and a rename, so a crash or a concurrent writer leaves either the old or
/// a complete new file. On unix the file is readable by its owner only.
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    /// Storage living in `storage.json` under `data_dir`
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join(STORAGE_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let dir = self.path.parent().unwrap_or_else(|| Path::new("."));
        let contents = serde_json::to_string_pretty(items)?;

        let mut tmp = NamedTempFile::new_in(dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            // Holds the session token: owner only
            tmp.as_file()
                .set_permissions(std::fs::Permissions::from_mode(STORAGE_FILE_MODE))?;
        }
        tmp.write_all(contents.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all()?.remove(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.read_all()?;
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)?;
        debug!(key, path = %self.path.display(), "Stored item");
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let mut items = self.read_all()?;
        if items.remove(key).is_some() {
            self.write_all(&items)?;
            debug!(key, path = %self.path.display(), "Removed item");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        assert_eq!(storage.get_item("token").unwrap(), None);
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_values_survive_a_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        FileStorage::new(dir.path()).set_item("token", "abc").unwrap();

        let reopened = FileStorage::new(dir.path());
        assert_eq!(reopened.get_item("token").unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn test_keys_are_independent() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.set_item("token", "abc").unwrap();
        storage.set_item("usernameKey", "root").unwrap();
        storage.remove_item("token").unwrap();

        assert_eq!(storage.get_item("token").unwrap(), None);
        assert_eq!(storage.get_item("usernameKey").unwrap().as_deref(), Some("root"));
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.remove_item("token").unwrap();
        storage.remove_item("token").unwrap();
        assert!(!storage.path().exists());
    }

    #[test]
    fn test_creates_missing_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let storage = FileStorage::new(&nested);
        storage.set_item("token", "abc").unwrap();
        assert!(nested.join(STORAGE_FILE).exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_storage_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.set_item("token", "secret").unwrap();

        let mode = std::fs::metadata(storage.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, STORAGE_FILE_MODE);
    }

    #[cfg(unix)]
    #[test]
    fn test_rewrite_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORAGE_FILE);
        std::fs::write(&path, r#"{"token":"old"}"#).unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();

        let storage = FileStorage::new(dir.path());
        storage.set_item("token", "new").unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, STORAGE_FILE_MODE);
        assert_eq!(storage.get_item("token").unwrap().as_deref(), Some("new"));
    }

    #[test]
    fn test_writes_leave_no_temp_files() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path());
        storage.set_item("token", "abc").unwrap();
        storage.set_item("usernameKey", "root").unwrap();
        storage.remove_item("token").unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from(STORAGE_FILE)]);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(STORAGE_FILE), "{not json").unwrap();
        let storage = FileStorage::new(dir.path());
        assert!(matches!(storage.get_item("token"), Err(StorageError::Corrupt(_))));
    }
}
