//! Persisted record of a successful install
//!
//! A browser keeps the worker registered across page loads. Here the record
//! lives next to the cache directory so every later process starts with the
//! controller already active.

use super::controller::{InstallReport, WorkerState};
use crate::error::{ProcurementError, ProcurementResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

const REGISTRATION_FILE: &str = "worker.json";

/// Registration record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerRegistration {
    /// Scope URL the manifest was resolved against
    pub scope: String,

    /// Cache the install populated
    pub cache_name: String,

    pub state: WorkerState,

    /// Number of cached entries
    pub entries: usize,

    pub installed_at: DateTime<Utc>,
}

impl WorkerRegistration {
    /// Build a registration from a completed install
    pub fn from_report(scope: &str, report: &InstallReport) -> Self {
        Self {
            scope: scope.to_string(),
            cache_name: report.cache_name.clone(),
            state: WorkerState::Active,
            entries: report.entries,
            installed_at: Utc::now(),
        }
    }

    pub fn file_path(dir: &Path) -> PathBuf {
        dir.join(REGISTRATION_FILE)
    }

    /// Load the registration from a cache directory, if any
    pub async fn load(dir: &Path) -> ProcurementResult<Option<Self>> {
        let path = Self::file_path(dir);

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await.map_err(|e| {
            ProcurementError::io(format!("reading worker registration {}", path.display()), e)
        })?;

        let registration: Self = serde_json::from_str(&content)?;
        Ok(Some(registration))
    }

    /// Save the registration into a cache directory
    pub async fn save(&self, dir: &Path) -> ProcurementResult<()> {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| ProcurementError::io("creating offline cache directory", e))?;

        let path = Self::file_path(dir);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(&path, content).await.map_err(|e| {
            ProcurementError::io(format!("writing worker registration {}", path.display()), e)
        })?;

        debug!("Registered worker for {} ({})", self.scope, self.cache_name);
        Ok(())
    }

    /// Whether this registration controls pages under `scope`
    pub fn controls(&self, scope: &str) -> bool {
        self.state == WorkerState::Active && self.scope == scope
    }
}
