use std::{collections::BTreeMap, path::{Path, PathBuf}, sync::Arc};
use tokio::{fs, sync::RwLock};
use tracing::warn;

use crate::errors::ServiceError;

/// Generic JSON file-backed key-value map store.
///
/// Persists a `BTreeMap<K, V>` to a JSON file, so entries are kept and listed
/// in key order. Every mutation rewrites the file through a temp file and a
/// rename, so a crash never leaves a half-written map behind.
#[derive(Clone)]
pub struct JsonMapStore<K, V> {
    inner: Arc<RwLock<BTreeMap<K, V>>>,
    file_path: PathBuf,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Ord + serde::Serialize + serde::de::DeserializeOwned + Clone,
    V: serde::Serialize + serde::de::DeserializeOwned + Clone,
{
    /// Initialize the store from a path. Creates the file with an empty map if missing;
    /// the parent directory must already exist.
    /// An existing file that does not parse is an error rather than an empty map.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        let map = match Self::load(&file_path).await? {
            Some(map) => map,
            None => {
                let empty = BTreeMap::new();
                write_atomic(&file_path, &empty).await?;
                empty
            }
        };
        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(map)), file_path }))
    }

    /// Read the map from disk; `None` when the file does not exist.
    async fn load(file_path: &Path) -> Result<Option<BTreeMap<K, V>>, ServiceError> {
        match fs::read(file_path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Some(BTreeMap::new())),
            Ok(bytes) => serde_json::from_slice(&bytes).map(Some).map_err(|e| {
                ServiceError::Db(format!("failed to parse {}: {}", file_path.display(), e))
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(ServiceError::Db(format!("failed to read {}: {}", file_path.display(), e))),
        }
    }

    /// List all entries as `(key, value)` pairs, in key order.
    pub async fn list(&self) -> Vec<(K, V)> {
        self.window(0, usize::MAX).await
    }

    /// Up to `limit` entries starting at position `offset`, in key order.
    pub async fn window(&self, offset: usize, limit: usize) -> Vec<(K, V)> {
        let map = self.inner.read().await;
        map.iter().skip(offset).take(limit).map(|(k, v)| (k.clone(), v.clone())).collect()
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    pub async fn contains_key(&self, key: &K) -> bool {
        self.inner.read().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Insert or update a value by key and persist.
    pub async fn insert(&self, key: K, value: V) -> Result<(), ServiceError> {
        self.update_map(|m| {
            m.insert(key, value);
            Ok(())
        })
        .await
    }

    /// Remove a key and persist; returns whether it existed.
    pub async fn remove(&self, key: &K) -> Result<bool, ServiceError> {
        let mut existed = false;
        self.update_map(|m| {
            existed = m.remove(key).is_some();
            Ok(())
        })
        .await?;
        Ok(existed)
    }

    /// Apply a mutation to the underlying map and persist.
    /// The map is mutated in place under the write lock. If the mutation or
    /// the save fails, the map is reloaded from disk so memory never holds
    /// unsaved entries.
    pub async fn update_map<F>(&self, f: F) -> Result<(), ServiceError>
    where
        F: FnOnce(&mut BTreeMap<K, V>) -> Result<(), ServiceError>,
    {
        let mut map = self.inner.write().await;
        let res = match f(&mut *map) {
            Ok(()) => write_atomic(&self.file_path, &*map).await,
            Err(e) => Err(e),
        };
        if let Err(e) = res {
            match Self::load(&self.file_path).await {
                Ok(disk) => *map = disk.unwrap_or_default(),
                Err(reload) => warn!(path = %self.file_path.display(), error = %reload, "json_map_reload_failed"),
            }
            return Err(e);
        }
        Ok(())
    }
}

/// Serialize compactly to a sibling temp file, then rename over `file_path`.
async fn write_atomic<T: serde::Serialize>(file_path: &Path, value: &T) -> Result<(), ServiceError> {
    let data = serde_json::to_vec(value).map_err(|e| ServiceError::Db(e.to_string()))?;
    let tmp = file_path.with_extension("json.tmp");
    fs::write(&tmp, data)
        .await
        .map_err(|e| ServiceError::Db(format!("failed to write {}: {}", tmp.display(), e)))?;
    if let Err(e) = fs::rename(&tmp, file_path).await {
        let _ = fs::remove_file(&tmp).await;
        return Err(ServiceError::Db(format!("failed to replace {}: {}", file_path.display(), e)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn json_map_store_crud_persists() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_map_store_{}.json", uuid::Uuid::new_v4()));
        let store = JsonMapStore::<String, String>::new(&tmp).await?;

        // initially empty
        assert_eq!(store.len().await, 0);

        // insert and check
        store.insert("b".into(), "2".into()).await?;
        store.insert("a".into(), "1".into()).await?;
        assert!(store.contains_key(&"a".into()).await);
        assert!(store.get(&"a".into()).await.unwrap() == "1");

        // listed in key order regardless of insertion order
        let keys: Vec<String> = store.list().await.into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["a".to_string(), "b".to_string()]);

        // update_map
        store
            .update_map(|m| {
                if let Some(v) = m.get_mut(&"a".to_string()) { *v = "10".into(); }
                Ok(())
            })
            .await?;
        assert_eq!(store.get(&"a".into()).await.unwrap(), "10");

        // remove and reload persistence
        let existed = store.remove(&"b".into()).await?;
        assert!(existed);
        let reloaded = JsonMapStore::<String, String>::new(&tmp).await?;
        let entries = reloaded.list().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(reloaded.get(&"a".into()).await.unwrap(), "10");
        assert!(!tmp.with_extension("json.tmp").exists());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_mutation_leaves_map_untouched() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_map_store_{}.json", uuid::Uuid::new_v4()));
        let store = JsonMapStore::<String, String>::new(&tmp).await?;
        store.insert("a".into(), "1".into()).await?;

        let res = store
            .update_map(|m| {
                m.insert("b".into(), "2".into());
                Err(ServiceError::Validation("rejected".into()))
            })
            .await;
        assert!(res.is_err());
        assert!(!store.contains_key(&"b".into()).await);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn failed_save_drops_unsaved_entry() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("json_map_store_{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&dir).await?;
        let store = JsonMapStore::<String, String>::new(dir.join("map.json")).await?;
        store.insert("a".into(), "1".into()).await?;

        // the directory vanishing makes the next save fail
        tokio::fs::remove_dir_all(&dir).await?;
        assert!(matches!(store.insert("b".into(), "2".into()).await, Err(ServiceError::Db(_))));
        assert!(!store.contains_key(&"b".into()).await);
        Ok(())
    }

    #[tokio::test]
    async fn window_reads_a_slice_in_key_order() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_map_store_{}.json", uuid::Uuid::new_v4()));
        let store = JsonMapStore::<String, u32>::new(&tmp).await?;
        for (i, k) in ["d", "b", "a", "c"].into_iter().enumerate() {
            store.insert(k.into(), i as u32).await?;
        }
        let keys: Vec<String> = store.window(1, 2).await.into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["b".to_string(), "c".to_string()]);
        assert!(store.window(10, 2).await.is_empty());

        // compact on disk
        let raw = tokio::fs::read_to_string(&tmp).await?;
        assert!(!raw.contains('\n'));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn missing_parent_dir_is_an_error() {
        let path = std::env::temp_dir().join(format!("json_map_store_{}", uuid::Uuid::new_v4())).join("map.json");
        assert!(JsonMapStore::<String, String>::new(path).await.is_err());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_map_store_{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, b"{not json").await?;
        let res = JsonMapStore::<String, String>::new(&tmp).await;
        assert!(matches!(res, Err(ServiceError::Db(_))));
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
