// Local key-value storage backed by the sled embedded database.
// Plays the role browser localStorage plays for the web client.

use anyhow::{Context, Result};
use sled::{Db, Tree};
use std::path::{Path, PathBuf};

const LOCAL_STORAGE_TREE: &str = "local_storage";

/// Key holding the bearer token
pub const TOKEN_KEY: &str = "token";
/// Key holding the serialized user record
pub const USER_KEY: &str = "user";
/// Key holding the opaque analytics session identifier
pub const ANALYTICS_SESSION_KEY: &str = "shg_session_id";

/// Persistent string key/value store
#[derive(Clone)]
pub struct Storage {
    db: Db,
    tree: Tree,
}

impl Storage {
    /// Get database directory path (~/.stay-hungry/storage)
    pub fn db_path() -> Result<PathBuf> {
        // Check for test environment variable first
        if let Ok(test_path) = std::env::var("STAY_HUNGRY_STORAGE_PATH") {
            return Ok(PathBuf::from(test_path));
        }

        let config_dir = crate::config::Config::config_dir()?;
        Ok(config_dir.join("storage"))
    }

    /// Open storage at the default location
    pub fn init() -> Result<Self> {
        let db_path = Self::db_path()?;
        Self::open(&db_path)
    }

    /// Open storage at a custom path
    pub fn open(path: &Path) -> Result<Self> {
        tracing::debug!("Opening local storage at {:?}", path);

        let db = sled::open(path).context("Failed to open sled database")?;
        let tree = db
            .open_tree(LOCAL_STORAGE_TREE)
            .context("Failed to open local storage tree")?;

        Ok(Self { db, tree })
    }

    /// Read a value; non UTF-8 contents read as missing
    pub fn get_item(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .tree
            .get(key.as_bytes())
            .with_context(|| format!("Failed to read '{}' from local storage", key))?;

        Ok(value.and_then(|bytes| String::from_utf8(bytes.to_vec()).ok()))
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.tree
            .insert(key.as_bytes(), value.as_bytes())
            .with_context(|| format!("Failed to write '{}' to local storage", key))?;

        self.db.flush().context("Failed to flush database")?;

        tracing::debug!("Stored '{}'", key);
        Ok(())
    }

    pub fn remove_item(&self, key: &str) -> Result<()> {
        let removed = self
            .tree
            .remove(key.as_bytes())
            .with_context(|| format!("Failed to remove '{}' from local storage", key))?
            .is_some();

        if removed {
            self.db.flush().context("Failed to flush database")?;
            tracing::debug!("Removed '{}'", key);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_set_get_remove() -> Result<()> {
        let dir = tempdir()?;
        let storage = Storage::open(dir.path())?;

        assert_eq!(storage.get_item(TOKEN_KEY)?, None);

        storage.set_item(TOKEN_KEY, "abc123")?;
        assert_eq!(storage.get_item(TOKEN_KEY)?, Some("abc123".to_string()));

        storage.remove_item(TOKEN_KEY)?;
        assert_eq!(storage.get_item(TOKEN_KEY)?, None);

        // Removing a missing key is not an error
        storage.remove_item(TOKEN_KEY)?;

        Ok(())
    }

    #[test]
    fn test_overwrite_keeps_latest_value() -> Result<()> {
        let dir = tempdir()?;
        let storage = Storage::open(dir.path())?;

        storage.set_item(USER_KEY, r#"{"nombre":"José"}"#)?;
        storage.set_item(USER_KEY, r#"{"nombre":"Ñuño"}"#)?;

        assert_eq!(
            storage.get_item(USER_KEY)?,
            Some(r#"{"nombre":"Ñuño"}"#.to_string())
        );

        Ok(())
    }
}
