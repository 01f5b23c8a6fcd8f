// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: (C) 2025 Cranky Kernel <crankykernel@proton.me>

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs as async_fs;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Debug, Error)]
pub enum KvError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("value for key {key} is not valid UTF-8")]
    Encoding { key: String },
}

/// Durable string-keyed storage. Values survive process restarts.
#[async_trait]
pub trait KeyValueStore: Send + Sync + std::fmt::Debug {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), KvError>;
}

/// Stores each key as a JSON file inside a single directory.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub async fn open<P: AsRef<Path>>(dir: P) -> Result<Self, KvError> {
        let dir = dir.as_ref().to_path_buf();
        async_fs::create_dir_all(&dir)
            .await
            .map_err(|source| KvError::Io {
                path: dir.clone(),
                source,
            })?;
        debug!("Opened key-value store at {}", dir.display());
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
            && !key.starts_with('.');

        let filename = if safe {
            format!("{}.json", key)
        } else {
            let mut hasher = Sha256::new();
            hasher.update(key.as_bytes());
            format!("{}.json", &format!("{:x}", hasher.finalize())[..16])
        };

        self.dir.join(filename)
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let path = self.path_for(key);
        match async_fs::read(&path).await {
            Ok(bytes) => String::from_utf8(bytes)
                .map(Some)
                .map_err(|_| KvError::Encoding {
                    key: key.to_string(),
                }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(KvError::Io { path, source }),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let path = self.path_for(key);
        // Write next to the target and rename so a crash never leaves a torn record.
        let tmp = path.with_extension("json.tmp");
        async_fs::write(&tmp, value)
            .await
            .map_err(|source| KvError::Io {
                path: tmp.clone(),
                source,
            })?;
        async_fs::rename(&tmp, &path)
            .await
            .map_err(|source| KvError::Io { path, source })
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.entries.lock().await.clone()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn file_store_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        assert_eq!(store.get("iptv-favorites").await.unwrap(), None);
        store.set("iptv-favorites", "[]").await.unwrap();
        assert_eq!(
            store.get("iptv-favorites").await.unwrap().as_deref(),
            Some("[]")
        );
        assert!(dir.path().join("iptv-favorites.json").exists());
        assert!(!dir.path().join("iptv-favorites.json.tmp").exists());

        store.set("iptv-favorites", "[{}]").await.unwrap();
        let reopened = FileStore::open(dir.path()).await.unwrap();
        assert_eq!(
            reopened.get("iptv-favorites").await.unwrap().as_deref(),
            Some("[{}]")
        );
    }

    #[tokio::test]
    async fn file_store_hashes_unsafe_keys() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();

        store.set("../escape/attempt", "x").await.unwrap();
        assert_eq!(
            store.get("../escape/attempt").await.unwrap().as_deref(),
            Some("x")
        );
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names.len(), 1);
        assert_eq!(names[0].len(), "0123456789abcdef.json".len());
    }

    #[tokio::test]
    async fn file_store_reports_invalid_utf8() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).await.unwrap();
        std::fs::write(dir.path().join("broken.json"), [0xff, 0xfe, 0x00]).unwrap();

        let err = store.get("broken").await.unwrap_err();
        assert!(matches!(err, KvError::Encoding { .. }));
    }
}
