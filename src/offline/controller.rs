//! Cache-first request handling
//!
//! The controller starts `Uninstalled`. `install` opens the manifest's cache
//! and populates it with every manifest entry, or with nothing at all if any
//! entry fails. Once `Active`, `handle_fetch` answers from the caches and only
//! falls back to the network on a miss; miss responses are never stored.

use super::http::{Request, Response};
use super::manifest::Manifest;
use super::network::Network;
use super::storage::CacheStorage;
use crate::error::{ProcurementError, ProcurementResult};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, error, info, warn};
use url::Url;

/// Lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    Uninstalled,
    Active,
}

impl std::fmt::Display for WorkerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Uninstalled => write!(f, "uninstalled"),
            Self::Active => write!(f, "active"),
        }
    }
}

/// Outcome of a successful install
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub cache_name: String,
    pub entries: usize,
    /// Total body bytes stored
    pub bytes: u64,
}

/// Where a fetched response came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    Cache,
    Network,
}

impl std::fmt::Display for FetchSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cache => write!(f, "cache"),
            Self::Network => write!(f, "network"),
        }
    }
}

/// A handled request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched {
    pub response: Response,
    pub source: FetchSource,
}

/// Offline cache controller
pub struct OfflineCacheController<C, N> {
    manifest: Manifest,
    scope: Url,
    caches: C,
    network: N,
    state: WorkerState,
}

impl<C: CacheStorage, N: Network> OfflineCacheController<C, N> {
    pub fn new(manifest: Manifest, scope: Url, caches: C, network: N) -> Self {
        Self {
            manifest,
            scope,
            caches,
            network,
            state: WorkerState::Uninstalled,
        }
    }

    /// Start in a known state, e.g. restored from a registration
    pub fn with_state(mut self, state: WorkerState) -> Self {
        self.state = state;
        self
    }

    pub fn state(&self) -> WorkerState {
        self.state
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn scope(&self) -> &Url {
        &self.scope
    }

    pub fn caches(&self) -> &C {
        &self.caches
    }

    pub fn network(&self) -> &N {
        &self.network
    }

    /// Populate the manifest's cache
    pub async fn install(&mut self) -> ProcurementResult<InstallReport> {
        self.install_with_progress(|_, _| {}).await
    }

    /// Populate the manifest's cache, reporting `(finished, total)` after each
    /// entry's fetch completes
    pub async fn install_with_progress<F>(&mut self, progress: F) -> ProcurementResult<InstallReport>
    where
        F: Fn(usize, usize) + Send + Sync,
    {
        let cache_name = self.manifest.cache_name.clone();
        let requests = self.manifest.requests(&self.scope)?;
        let total = requests.len();

        info!("Installing {} entries into {}", total, cache_name);
        self.caches.open(&cache_name).await?;

        let network = &self.network;
        let finished = AtomicUsize::new(0);
        let progress = &progress;
        let finished_ref = &finished;

        let results = join_all(requests.iter().map(|request| async move {
            let result = network.fetch(request).await;
            let done = finished_ref.fetch_add(1, Ordering::SeqCst) + 1;
            progress(done, total);
            result
        }))
        .await;

        let mut entries = Vec::with_capacity(total);
        let mut bytes = 0u64;
        for (request, result) in requests.into_iter().zip(results) {
            let reason = match result {
                Ok(response) if response.ok() => {
                    bytes += response.body.len() as u64;
                    entries.push((request, response));
                    continue;
                }
                Ok(response) => format!("HTTP {}", response.status),
                Err(e) => e.to_string(),
            };

            error!(
                "Install of {} failed at {}: {}",
                cache_name,
                request.url.as_str(),
                reason
            );
            return Err(ProcurementError::InstallFailed {
                cache: cache_name,
                url: request.url.to_string(),
                reason,
            });
        }

        let count = entries.len();
        self.caches.put_all(&cache_name, entries).await?;
        self.state = WorkerState::Active;

        info!("Installed {} entries ({} bytes) into {}", count, bytes, cache_name);
        Ok(InstallReport {
            cache_name,
            entries: count,
            bytes,
        })
    }

    /// Answer an intercepted request
    pub async fn handle_fetch(&self, request: &Request) -> ProcurementResult<Fetched> {
        if self.state != WorkerState::Active {
            debug!("Not controlling, passing {} through", request.url);
            return self.from_network(request).await;
        }

        match self.caches.match_any(request).await {
            Ok(Some(response)) => {
                debug!("Cache hit for {}", request.url);
                return Ok(Fetched {
                    response,
                    source: FetchSource::Cache,
                });
            }
            Ok(None) => debug!("Cache miss for {}", request.url),
            Err(e) => warn!("Cache lookup for {} failed: {}", request.url, e),
        }

        self.from_network(request).await
    }

    async fn from_network(&self, request: &Request) -> ProcurementResult<Fetched> {
        let response = self.network.fetch(request).await?;
        Ok(Fetched {
            response,
            source: FetchSource::Network,
        })
    }
}
