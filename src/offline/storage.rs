//! Named cache storage
//!
//! Mirrors the browser's cache storage: any number of named caches, each a
//! map from request URL to stored response. Caches are created on open and
//! are never deleted here; a new manifest version simply opens a new cache.

use super::http::{Request, Response};
use crate::error::{ProcurementError, ProcurementResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tokio::fs;
use tracing::{debug, warn};

/// Storage of named caches
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a cache, creating it empty if it does not exist
    async fn open(&self, name: &str) -> ProcurementResult<()>;

    /// Whether a cache with this name exists
    async fn has(&self, name: &str) -> ProcurementResult<bool>;

    /// Cache names in creation order
    async fn keys(&self) -> ProcurementResult<Vec<String>>;

    /// Store every entry in one step. Existing entries for the same URL are
    /// replaced.
    async fn put_all(&self, name: &str, entries: Vec<(Request, Response)>)
        -> ProcurementResult<()>;

    /// Look a request up in one cache. Only GET requests ever match.
    async fn lookup(&self, name: &str, request: &Request) -> ProcurementResult<Option<Response>>;

    /// URLs stored in one cache
    async fn entries(&self, name: &str) -> ProcurementResult<Vec<String>>;

    /// First match across every cache, oldest cache first
    async fn match_any(&self, request: &Request) -> ProcurementResult<Option<Response>> {
        if !request.is_get() {
            return Ok(None);
        }
        for name in self.keys().await? {
            if let Some(response) = self.lookup(&name, request).await? {
                return Ok(Some(response));
            }
        }
        Ok(None)
    }
}

#[derive(Debug, Clone)]
struct MemoryCache {
    name: String,
    entries: Vec<(String, Response)>,
}

/// Cache storage held in memory
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    caches: Mutex<Vec<MemoryCache>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_caches<T>(&self, f: impl FnOnce(&mut Vec<MemoryCache>) -> T) -> ProcurementResult<T> {
        let mut caches = self
            .caches
            .lock()
            .map_err(|_| ProcurementError::CacheBackend("cache storage lock poisoned".to_string()))?;
        Ok(f(&mut caches))
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &str) -> ProcurementResult<()> {
        self.with_caches(|caches| {
            if !caches.iter().any(|cache| cache.name == name) {
                caches.push(MemoryCache {
                    name: name.to_string(),
                    entries: Vec::new(),
                });
            }
        })
    }

    async fn has(&self, name: &str) -> ProcurementResult<bool> {
        self.with_caches(|caches| caches.iter().any(|cache| cache.name == name))
    }

    async fn keys(&self) -> ProcurementResult<Vec<String>> {
        self.with_caches(|caches| caches.iter().map(|cache| cache.name.clone()).collect())
    }

    async fn put_all(
        &self,
        name: &str,
        entries: Vec<(Request, Response)>,
    ) -> ProcurementResult<()> {
        self.with_caches(|caches| {
            let Some(cache) = caches.iter_mut().find(|cache| cache.name == name) else {
                return Err(ProcurementError::CacheBackend(format!(
                    "cache {} is not open",
                    name
                )));
            };
            for (request, response) in entries {
                let key = request.cache_key();
                cache.entries.retain(|(existing, _)| *existing != key);
                cache.entries.push((key, response));
            }
            Ok(())
        })?
    }

    async fn lookup(&self, name: &str, request: &Request) -> ProcurementResult<Option<Response>> {
        if !request.is_get() {
            return Ok(None);
        }
        let key = request.cache_key();
        self.with_caches(|caches| {
            caches
                .iter()
                .find(|cache| cache.name == name)
                .and_then(|cache| cache.entries.iter().find(|(stored, _)| *stored == key))
                .map(|(_, response)| response.clone())
        })
    }

    async fn entries(&self, name: &str) -> ProcurementResult<Vec<String>> {
        self.with_caches(|caches| {
            caches
                .iter()
                .find(|cache| cache.name == name)
                .map(|cache| cache.entries.iter().map(|(key, _)| key.clone()).collect())
                .unwrap_or_default()
        })
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct CacheIndex {
    caches: Vec<CacheIndexEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheIndexEntry {
    name: String,
    /// Directory of the committed generation
    dir: String,
    #[serde(default)]
    generation: u64,
    created_at: DateTime<Utc>,
}

/// Stored response metadata; the body lives next to it
#[derive(Debug, Clone, Serialize, Deserialize)]
struct EntryMeta {
    request_url: String,
    response_url: String,
    status: u16,
    headers: Vec<(String, String)>,
    stored_at: DateTime<Utc>,
}

/// Cache storage on disk
///
/// Layout: `<root>/index.json` lists caches in creation order; each cache is
/// a directory of `<sha256>.json` metadata and `<sha256>.body` files.
///
/// `put_all` writes a complete new generation of the cache directory and
/// commits it by rewriting the index, which is replaced atomically. Until
/// then readers keep seeing the previous generation.
#[derive(Debug, Clone)]
pub struct DiskCacheStorage {
    root: PathBuf,
}

impl DiskCacheStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn index_path(&self) -> PathBuf {
        self.root.join("index.json")
    }

    async fn read_index(&self) -> ProcurementResult<CacheIndex> {
        let path = self.index_path();
        if !path.exists() {
            return Ok(CacheIndex::default());
        }

        let content = fs::read_to_string(&path).await.map_err(|e| {
            ProcurementError::io(format!("reading cache index {}", path.display()), e)
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ProcurementError::CacheBackend(format!("corrupt cache index {}: {}", path.display(), e))
        })
    }

    async fn write_index(&self, index: &CacheIndex) -> ProcurementResult<()> {
        let path = self.index_path();
        let temp_path = path.with_extension("tmp");
        let content = serde_json::to_string_pretty(index)?;

        fs::write(&temp_path, content).await.map_err(|e| {
            ProcurementError::io(format!("writing cache index {}", temp_path.display()), e)
        })?;
        fs::rename(&temp_path, &path).await.map_err(|e| {
            ProcurementError::io(format!("replacing cache index {}", path.display()), e)
        })?;
        Ok(())
    }

    async fn cache_dir(&self, name: &str) -> ProcurementResult<Option<PathBuf>> {
        let index = self.read_index().await?;
        Ok(index
            .caches
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| self.root.join(&entry.dir)))
    }
}

#[async_trait]
impl CacheStorage for DiskCacheStorage {
    async fn open(&self, name: &str) -> ProcurementResult<()> {
        fs::create_dir_all(&self.root).await.map_err(|e| {
            ProcurementError::io(format!("creating cache root {}", self.root.display()), e)
        })?;

        let mut index = self.read_index().await?;
        if index.caches.iter().any(|entry| entry.name == name) {
            return Ok(());
        }

        let dir = generation_dir(name, 0);
        let path = self.root.join(&dir);
        fs::create_dir_all(&path).await.map_err(|e| {
            ProcurementError::io(format!("creating cache directory {}", path.display()), e)
        })?;

        index.caches.push(CacheIndexEntry {
            name: name.to_string(),
            dir,
            generation: 0,
            created_at: Utc::now(),
        });
        self.write_index(&index).await?;

        debug!("Created cache {} at {}", name, path.display());
        Ok(())
    }

    async fn has(&self, name: &str) -> ProcurementResult<bool> {
        Ok(self.cache_dir(name).await?.is_some())
    }

    async fn keys(&self) -> ProcurementResult<Vec<String>> {
        let index = self.read_index().await?;
        Ok(index.caches.into_iter().map(|entry| entry.name).collect())
    }

    async fn put_all(
        &self,
        name: &str,
        entries: Vec<(Request, Response)>,
    ) -> ProcurementResult<()> {
        let mut index = self.read_index().await?;
        let Some(position) = index.caches.iter().position(|entry| entry.name == name) else {
            return Err(ProcurementError::CacheBackend(format!("cache {} is not open", name)));
        };

        let current = self.root.join(&index.caches[position].dir);
        let generation = index.caches[position].generation + 1;
        let next_dir = generation_dir(name, generation);
        let next = self.root.join(&next_dir);

        let count = entries.len();
        if let Err(e) = write_generation(&current, &next, entries).await {
            if next.is_dir() {
                let _ = fs::remove_dir_all(&next).await;
            }
            return Err(e);
        }

        index.caches[position].dir = next_dir;
        index.caches[position].generation = generation;
        if let Err(e) = self.write_index(&index).await {
            let _ = fs::remove_dir_all(&next).await;
            return Err(e);
        }

        // No longer referenced by the index
        if let Err(e) = fs::remove_dir_all(&current).await {
            warn!("Failed to remove old cache generation {}: {}", current.display(), e);
        }

        debug!("Stored {} entries in cache {} (generation {})", count, name, generation);
        Ok(())
    }

    async fn lookup(&self, name: &str, request: &Request) -> ProcurementResult<Option<Response>> {
        if !request.is_get() {
            return Ok(None);
        }
        let Some(dir) = self.cache_dir(name).await? else {
            return Ok(None);
        };

        let stem = entry_stem(&request.cache_key());
        let meta_path = dir.join(format!("{}.json", stem));
        if !meta_path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&meta_path).await.map_err(|e| {
            ProcurementError::io(format!("reading cache entry {}", meta_path.display()), e)
        })?;
        let meta: EntryMeta = serde_json::from_str(&content)?;

        let body_path = dir.join(format!("{}.body", stem));
        let body = fs::read(&body_path).await.map_err(|e| {
            ProcurementError::io(format!("reading cache body {}", body_path.display()), e)
        })?;

        Ok(Some(Response {
            url: meta.response_url,
            status: meta.status,
            headers: meta.headers,
            body,
        }))
    }

    async fn entries(&self, name: &str) -> ProcurementResult<Vec<String>> {
        let Some(dir) = self.cache_dir(name).await? else {
            return Ok(Vec::new());
        };

        let mut metas = Vec::new();
        let mut read_dir = fs::read_dir(&dir)
            .await
            .map_err(|e| ProcurementError::io(format!("reading cache {}", dir.display()), e))?;

        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| ProcurementError::io("reading cache entry", e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                if let Ok(content) = fs::read_to_string(&path).await {
                    if let Ok(meta) = serde_json::from_str::<EntryMeta>(&content) {
                        metas.push(meta);
                    }
                }
            }
        }

        metas.sort_by(|a, b| a.stored_at.cmp(&b.stored_at).then(a.request_url.cmp(&b.request_url)));
        Ok(metas.into_iter().map(|meta| meta.request_url).collect())
    }
}

/// File stem for a cache key: first 16 bytes of its SHA-256, hex encoded
fn entry_stem(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let digest = hasher.finalize();
    hex::encode(&digest[..16])
}

/// Directory for one generation of a cache: a hash of the name, so distinct
/// names never share a directory
fn generation_dir(name: &str, generation: u64) -> String {
    let digest = Sha256::digest(name.as_bytes());
    format!("{}.{}", hex::encode(&digest[..8]), generation)
}

/// Build `next` from the entries already in `current` plus `entries`
async fn write_generation(
    current: &Path,
    next: &Path,
    entries: Vec<(Request, Response)>,
) -> ProcurementResult<()> {
    if fs::try_exists(next).await.unwrap_or(false) {
        fs::remove_dir_all(next).await.map_err(|e| {
            ProcurementError::io(format!("clearing cache generation {}", next.display()), e)
        })?;
    }
    fs::create_dir_all(next).await.map_err(|e| {
        ProcurementError::io(format!("creating cache generation {}", next.display()), e)
    })?;

    if current.is_dir() {
        let mut read_dir = fs::read_dir(current)
            .await
            .map_err(|e| ProcurementError::io(format!("reading cache {}", current.display()), e))?;
        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| ProcurementError::io("reading cache entry", e))?
        {
            fs::copy(entry.path(), next.join(entry.file_name()))
                .await
                .map_err(|e| ProcurementError::io(format!("copying {}", entry.path().display()), e))?;
        }
    }

    for (request, response) in entries {
        let key = request.cache_key();
        let stem = entry_stem(&key);
        let meta = EntryMeta {
            request_url: key,
            response_url: response.url.clone(),
            status: response.status,
            headers: response.headers.clone(),
            stored_at: Utc::now(),
        };

        fs::write(next.join(format!("{}.body", stem)), &response.body)
            .await
            .map_err(|e| ProcurementError::io(format!("writing body for {}", meta.request_url), e))?;
        fs::write(next.join(format!("{}.json", stem)), serde_json::to_string_pretty(&meta)?)
            .await
            .map_err(|e| ProcurementError::io(format!("writing metadata for {}", meta.request_url), e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use url::Url;

    fn request(path: &str) -> Request {
        let scope = Url::parse("https://example.org/portal/").unwrap();
        Request::resolve(&scope, path).unwrap()
    }

    fn response(path: &str, body: &str) -> Response {
        Response::new(request(path).url.to_string(), 200, body)
            .with_header("content-type", "text/html")
    }

    #[tokio::test]
    async fn memory_open_is_idempotent_and_ordered() {
        let storage = MemoryCacheStorage::new();
        storage.open("v1").await.unwrap();
        storage.open("v2").await.unwrap();
        storage.open("v1").await.unwrap();

        assert_eq!(storage.keys().await.unwrap(), vec!["v1", "v2"]);
        assert!(storage.has("v2").await.unwrap());
        assert!(!storage.has("v3").await.unwrap());
    }

    #[tokio::test]
    async fn memory_put_and_lookup() {
        let storage = MemoryCacheStorage::new();
        storage.open("v1").await.unwrap();
        storage
            .put_all("v1", vec![(request("index.html"), response("index.html", "home"))])
            .await
            .unwrap();

        let hit = storage.lookup("v1", &request("index.html#top")).await.unwrap();
        assert_eq!(hit.unwrap().body, b"home");

        let post = request("index.html").with_method("POST");
        assert!(storage.lookup("v1", &post).await.unwrap().is_none());
        assert!(storage.match_any(&post).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn memory_put_requires_open_cache() {
        let storage = MemoryCacheStorage::new();
        let result = storage
            .put_all("v1", vec![(request("a"), response("a", "a"))])
            .await;
        assert!(matches!(result, Err(ProcurementError::CacheBackend(_))));
    }

    #[tokio::test]
    async fn match_any_prefers_oldest_cache() {
        let storage = MemoryCacheStorage::new();
        storage.open("v1").await.unwrap();
        storage.open("v2").await.unwrap();
        storage
            .put_all("v2", vec![(request("app.js"), response("app.js", "new"))])
            .await
            .unwrap();
        storage
            .put_all("v1", vec![(request("app.js"), response("app.js", "old"))])
            .await
            .unwrap();

        let hit = storage.match_any(&request("app.js")).await.unwrap().unwrap();
        assert_eq!(hit.body, b"old");
    }

    #[tokio::test]
    async fn disk_roundtrip() {
        let temp = TempDir::new().unwrap();
        let storage = DiskCacheStorage::new(temp.path().join("caches"));

        storage.open("mh-procurement-cache-v1").await.unwrap();
        storage
            .put_all(
                "mh-procurement-cache-v1",
                vec![
                    (request("./"), response("./", "root")),
                    (request("./index.html"), response("./index.html", "index")),
                ],
            )
            .await
            .unwrap();

        let hit = storage
            .lookup("mh-procurement-cache-v1", &request("index.html"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(hit.status, 200);
        assert_eq!(hit.body, b"index");
        assert_eq!(hit.header("Content-Type"), Some("text/html"));

        let entries = storage.entries("mh-procurement-cache-v1").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries.contains(&"https://example.org/portal/".to_string()));

        // Only the committed generation is left on disk
        let dirs: Vec<_> = std::fs::read_dir(temp.path().join("caches"))
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.is_dir())
            .collect();
        assert_eq!(dirs.len(), 1);
        assert!(dirs[0].ends_with(generation_dir("mh-procurement-cache-v1", 1)));
    }

    #[tokio::test]
    async fn disk_caches_survive_new_instance() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("caches");

        let storage = DiskCacheStorage::new(&root);
        storage.open("v1").await.unwrap();
        storage.open("v2").await.unwrap();
        storage
            .put_all("v1", vec![(request("a.css"), response("a.css", "body{}"))])
            .await
            .unwrap();

        let reopened = DiskCacheStorage::new(&root);
        assert_eq!(reopened.keys().await.unwrap(), vec!["v1", "v2"]);
        let hit = reopened.match_any(&request("a.css")).await.unwrap();
        assert_eq!(hit.unwrap().body, b"body{}");
    }

    #[tokio::test]
    async fn disk_lookup_in_missing_cache() {
        let temp = TempDir::new().unwrap();
        let storage = DiskCacheStorage::new(temp.path());
        assert!(storage.lookup("nope", &request("a")).await.unwrap().is_none());
        assert!(storage.entries("nope").await.unwrap().is_empty());
        assert!(storage.keys().await.unwrap().is_empty());
    }

    #[test]
    fn entry_stem_is_stable() {
        let a = entry_stem("https://example.org/a");
        assert_eq!(a, entry_stem("https://example.org/a"));
        assert_ne!(a, entry_stem("https://example.org/b"));
        assert_eq!(a.len(), 32);
    }

    #[test]
    fn generation_dirs_do_not_collide() {
        assert_ne!(generation_dir("a/b", 0), generation_dir("a_b", 0));
        assert_ne!(generation_dir("v1", 0), generation_dir("v1", 1));
        assert_eq!(generation_dir("v1", 3), generation_dir("v1", 3));
    }

    #[tokio::test]
    async fn similar_names_stay_separate_caches() {
        let temp = TempDir::new().unwrap();
        let storage = DiskCacheStorage::new(temp.path());
        storage.open("a/b").await.unwrap();
        storage.open("a_b").await.unwrap();
        storage
            .put_all("a/b", vec![(request("x.css"), response("x.css", "slash"))])
            .await
            .unwrap();
        storage
            .put_all("a_b", vec![(request("x.css"), response("x.css", "underscore"))])
            .await
            .unwrap();

        let slash = storage.lookup("a/b", &request("x.css")).await.unwrap().unwrap();
        let underscore = storage.lookup("a_b", &request("x.css")).await.unwrap().unwrap();
        assert_eq!(slash.body, b"slash");
        assert_eq!(underscore.body, b"underscore");
    }

    #[tokio::test]
    async fn later_put_keeps_earlier_entries() {
        let temp = TempDir::new().unwrap();
        let storage = DiskCacheStorage::new(temp.path());
        storage.open("v1").await.unwrap();
        storage
            .put_all("v1", vec![(request("a.css"), response("a.css", "a"))])
            .await
            .unwrap();
        storage
            .put_all("v1", vec![(request("b.css"), response("b.css", "b"))])
            .await
            .unwrap();

        assert_eq!(storage.entries("v1").await.unwrap().len(), 2);
        assert!(storage.lookup("v1", &request("a.css")).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn failed_put_leaves_committed_generation() {
        let temp = TempDir::new().unwrap();
        let storage = DiskCacheStorage::new(temp.path());
        storage.open("v1").await.unwrap();
        storage
            .put_all("v1", vec![(request("a.css"), response("a.css", "a"))])
            .await
            .unwrap();

        // A plain file where the next generation directory would go
        let blocker = temp.path().join(generation_dir("v1", 2));
        std::fs::write(&blocker, "in the way").unwrap();

        let result = storage
            .put_all(
                "v1",
                vec![
                    (request("b.css"), response("b.css", "b")),
                    (request("c.css"), response("c.css", "c")),
                ],
            )
            .await;
        assert!(result.is_err());

        assert_eq!(storage.entries("v1").await.unwrap(), vec!["https://example.org/portal/a.css"]);
        assert!(storage.lookup("v1", &request("b.css")).await.unwrap().is_none());
        assert_eq!(
            storage.lookup("v1", &request("a.css")).await.unwrap().unwrap().body,
            b"a"
        );
    }
}
