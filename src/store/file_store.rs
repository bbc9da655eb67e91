//! JSON file backed [`SessionStore`].
//!
//! All keys live in one JSON object on disk. Every write re-reads the file,
//! updates one key and replaces the file through a temporary sibling, so a
//! crash mid-write never leaves a truncated store behind.

use std::collections::HashMap;

use log::{debug, trace, warn};
use tokio::{fs, sync::Mutex};

use crate::store::SessionStore;

/// Key/value store persisted as a single JSON object file.
///
/// # Examples
///
/// ```no_run
/// use clanbot::store::{FileSessionStore, SessionStore};
///
/// # async fn example() -> anyhow::Result<()> {
/// let store = FileSessionStore::new("./data/store.json".to_string());
/// store.set("attackLastReset", "2024-03-10T21:00:00Z").await?;
/// assert!(store.get("attackLastReset").await?.is_some());
/// # Ok(())
/// # }
/// ```
pub struct FileSessionStore {
    /// Path to the JSON file
    path: String,
    /// Serialises read-modify-write cycles
    write_lock: Mutex<()>,
}

impl FileSessionStore {
    pub fn new(path: String) -> Self {
        FileSessionStore {
            path,
            write_lock: Mutex::new(()),
        }
    }

    async fn read_all(&self) -> anyhow::Result<HashMap<String, String>> {
        let serialized = match fs::read_to_string(&self.path).await {
            Ok(serialized) => serialized,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("no session store at {}, starting empty", self.path);
                return Ok(HashMap::new());
            }
            Err(e) => return Err(e.into()),
        };

        Ok(serde_json::from_str(&serialized)?)
    }
}

impl SessionStore for FileSessionStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        let value = self.read_all().await?.remove(key);
        debug!("session store get {} -> {:?}", key, value);
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.read_all().await?;
        entries.insert(key.to_owned(), value.to_owned());

        let serialized = serde_json::to_string(&entries)?;
        let tmp_path = format!("{}.tmp", self.path);
        fs::write(&tmp_path, serialized).await?;
        fs::rename(&tmp_path, &self.path).await?;

        trace!("session store set {} = {}", key, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> FileSessionStore {
        let path = dir.path().join("store.json");
        FileSessionStore::new(path.to_string_lossy().into_owned())
    }

    #[tokio::test]
    async fn test_get_missing_file_returns_none() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.get("battleStatus").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set("battleStatus", "[]").await.unwrap();

        assert_eq!(
            store.get("battleStatus").await.unwrap(),
            Some("[]".to_string())
        );
    }

    #[tokio::test]
    async fn test_set_keeps_other_keys() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set("a", "1").await.unwrap();
        store.set("b", "2").await.unwrap();
        store.set("a", "3").await.unwrap();

        assert_eq!(store.get("a").await.unwrap(), Some("3".to_string()));
        assert_eq!(store.get("b").await.unwrap(), Some("2".to_string()));
    }

    #[tokio::test]
    async fn test_values_survive_a_new_instance() {
        let dir = TempDir::new().unwrap();
        store_in(&dir).set("attackLastReset", "now").await.unwrap();

        let reopened = store_in(&dir);
        assert_eq!(
            reopened.get("attackLastReset").await.unwrap(),
            Some("now".to_string())
        );
    }

    #[tokio::test]
    async fn test_corrupted_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        fs::write(dir.path().join("store.json"), "{ not json")
            .await
            .unwrap();

        assert!(store.get("battleStatus").await.is_err());
        assert!(store.set("battleStatus", "[]").await.is_err());
    }
}
