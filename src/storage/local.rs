//! Local filesystem storage root.

use super::Storage;
use crate::error::{EtlError, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        key.split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |path, segment| path.join(segment))
    }
}

/// Recursively collects file keys below `dir`, relative to `root`.
fn walk_files(root: &Path, dir: &Path) -> std::io::Result<Vec<String>> {
    let mut keys = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = match entry.path().strip_prefix(root) {
            Ok(relative) => relative,
            Err(_) => continue,
        };
        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        keys.push(key);
    }
    Ok(keys)
}

#[async_trait]
impl Storage for LocalStorage {
    async fn list_prefix(&self, prefix: &str) -> Result<Vec<String>> {
        // Walk only the deepest directory the prefix fully names.
        let dir_part = match prefix.rfind('/') {
            Some(slash) => &prefix[..slash],
            None => "",
        };
        let dir = self.path_for(dir_part);
        if !dir.is_dir() {
            return Ok(Vec::new());
        }

        let root = self.root.clone();
        let location = self.uri_for(prefix);
        let keys = tokio::task::spawn_blocking(move || walk_files(&root, &dir))
            .await
            .map_err(|e| EtlError::storage(&location, e))?
            .map_err(|e| EtlError::storage(&location, e))?;

        Ok(keys
            .into_iter()
            .filter(|key| key.starts_with(prefix))
            .collect())
    }

    async fn read(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.path_for(key);
        fs::read(&path)
            .await
            .map_err(|e| EtlError::storage(path.display().to_string(), e))
    }

    async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let path = self.path_for(key);
        let location = path.display().to_string();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| EtlError::storage(&location, e))?;
        }

        // Write to a sibling temp file first so readers never see a torn file
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| EtlError::storage(&location, "key has no file name"))?;
        let temp_path = path.with_file_name(format!(".{}.tmp", file_name));
        fs::write(&temp_path, bytes)
            .await
            .map_err(|e| EtlError::storage(&location, e))?;
        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| EtlError::storage(&location, e))?;
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> Result<usize> {
        let keys = self.list_prefix(prefix).await?;
        for key in &keys {
            let path = self.path_for(key);
            fs::remove_file(&path)
                .await
                .map_err(|e| EtlError::storage(path.display().to_string(), e))?;
        }

        // A directory prefix leaves no empty directory tree behind
        if prefix.ends_with('/') {
            let dir = self.path_for(prefix);
            if dir.is_dir() {
                fs::remove_dir_all(&dir)
                    .await
                    .map_err(|e| EtlError::storage(dir.display().to_string(), e))?;
            }
        }
        Ok(keys.len())
    }

    fn uri_for(&self, key: &str) -> String {
        self.path_for(key).display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::glob_keys;
    use tempfile::TempDir;

    async fn storage_with(files: &[&str]) -> (TempDir, LocalStorage) {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path());
        for key in files {
            storage.write(key, b"{}".to_vec()).await.unwrap();
        }
        (dir, storage)
    }

    #[tokio::test]
    async fn write_then_read() {
        let (_dir, storage) = storage_with(&[]).await;
        storage
            .write("a/b/c.json", b"hello".to_vec())
            .await
            .unwrap();
        assert_eq!(storage.read("a/b/c.json").await.unwrap(), b"hello");
        // No temp file left behind
        assert_eq!(storage.list_prefix("a/").await.unwrap(), vec!["a/b/c.json"]);
    }

    #[tokio::test]
    async fn read_missing_key_is_storage_error() {
        let (_dir, storage) = storage_with(&[]).await;
        let err = storage.read("missing.json").await.unwrap_err();
        assert!(matches!(err, EtlError::Storage { .. }));
    }

    #[tokio::test]
    async fn list_prefix_filters_by_string_prefix() {
        let (_dir, storage) =
            storage_with(&["log_data/2018/11/a.json", "log_data/2018/12/b.json", "other/c.json"])
                .await;

        let mut keys = storage.list_prefix("log_data/2018/1").await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["log_data/2018/11/a.json", "log_data/2018/12/b.json"]);
        assert!(storage.list_prefix("nothing/here/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn glob_over_local_tree() {
        let (_dir, storage) = storage_with(&[
            "song_data/A/A/B/TRAAB.json",
            "song_data/A/A/A/TRAAA.json",
            "song_data/A/B/A/TRABA.json",
            "song_data/A/A/A/_SUCCESS",
        ])
        .await;

        let keys = glob_keys(&storage, "song_data/A/A/*/").await.unwrap();
        assert_eq!(
            keys,
            vec!["song_data/A/A/A/TRAAA.json", "song_data/A/A/B/TRAAB.json"]
        );
    }

    #[tokio::test]
    async fn glob_ignores_hidden_directories() {
        let (_dir, storage) = storage_with(&[
            "log_data/2018/11/a.json",
            "log_data/2018/_temporary/b.json",
            "log_data/.staging/11/c.json",
        ])
        .await;

        let keys = glob_keys(&storage, "log_data/*/*/*").await.unwrap();
        assert_eq!(keys, vec!["log_data/2018/11/a.json"]);
    }

    #[tokio::test]
    async fn delete_prefix_removes_directory() {
        let (dir, storage) = storage_with(&[
            "songs.parquet/year=2000/part-0.parquet",
            "songs.parquet/_SUCCESS",
            "artists.parquet/part-0.parquet",
        ])
        .await;

        let removed = storage.delete_prefix("songs.parquet/").await.unwrap();
        assert_eq!(removed, 2);
        assert!(!dir.path().join("songs.parquet").exists());
        assert!(dir.path().join("artists.parquet/part-0.parquet").exists());
    }
}
