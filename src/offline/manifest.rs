//! Offline cache manifest
//!
//! A manifest is a versioned cache name plus the ordered list of asset URLs
//! copied into that cache at install time. Relative entries resolve against
//! the scope URL the site is served from.

use super::http::Request;
use crate::error::{ProcurementError, ProcurementResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use url::Url;

/// Cache name of the deployed site
pub const CACHE_NAME: &str = "mh-procurement-cache-v1";

const BUILTIN_URLS: &[&str] = &[
    "./",
    "./index.html",
    "./manifest.json",
    "./pages/about.html",
    "./pages/contact.html",
    "./pages/medical-supplies.html",
    "./pages/office-supplies.html",
    "./pages/pharmaceuticals.html",
    "./pages/services.html",
    "./pages/how-it-works.html",
    "./pages/lab-equipment.html",
    "./pages/emergency-contact.html",
    "./commons/header.html",
    "./commons/footer.html",
    "./assets/css/style.css",
    "./assets/css/output.css",
    "./assets/js/index.js",
    "./assets/images/logo.png",
    "./assets/images/icons/icon-72x72.png",
    "./assets/images/icons/manifest-icon-192.maskable.png",
    "./assets/images/icons/manifest-icon-512.maskable.png",
    "./assets/images/screenshots/homepage-wide.png",
    "./assets/images/screenshots/homepage-mobile.png",
    "https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.4.0/css/all.min.css",
];

/// Parsed manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Versioned cache name; a new name means a new cache
    pub cache_name: String,

    /// Asset URLs in install order
    #[serde(default)]
    pub urls: Vec<String>,
}

impl Manifest {
    /// The asset list shipped with the site
    pub fn builtin() -> Self {
        Self {
            cache_name: CACHE_NAME.to_string(),
            urls: BUILTIN_URLS.iter().map(|url| url.to_string()).collect(),
        }
    }

    /// Parse a manifest from a TOML file on disk
    pub async fn from_file(path: &Path) -> ProcurementResult<Self> {
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            ProcurementError::io(format!("reading offline manifest {}", path.display()), e)
        })?;
        Self::parse(&content)
    }

    /// Parse a manifest from a TOML string
    pub fn parse(content: &str) -> ProcurementResult<Self> {
        let manifest: Self = toml::from_str(content)
            .map_err(|e| ProcurementError::ManifestInvalid(e.to_string()))?;

        if manifest.cache_name.trim().is_empty() {
            return Err(ProcurementError::ManifestInvalid(
                "cache_name must not be empty".to_string(),
            ));
        }
        Ok(manifest)
    }

    /// Resolve every entry into a GET request, rejecting duplicates
    pub fn requests(&self, scope: &Url) -> ProcurementResult<Vec<Request>> {
        let mut seen = HashSet::new();
        let mut requests = Vec::with_capacity(self.urls.len());

        for entry in &self.urls {
            let request = Request::resolve(scope, entry)?;
            if !seen.insert(request.cache_key()) {
                return Err(ProcurementError::ManifestInvalid(format!(
                    "duplicate entry {} (resolves to {})",
                    entry,
                    request.cache_key()
                )));
            }
            requests.push(request);
        }

        Ok(requests)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }
}
