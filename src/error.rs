//! Error types for the procurement toolkit
//!
//! All modules use `ProcurementResult<T>` as their return type.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for procurement operations
pub type ProcurementResult<T> = Result<T, ProcurementError>;

/// All errors that can occur in the procurement toolkit
#[derive(Error, Debug)]
pub enum ProcurementError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Failed to create config directory {path}: {source}")]
    ConfigDirCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unknown configuration key: {0}")]
    ConfigKeyUnknown(String),

    // Storage errors
    #[error("Storage read failed for key {key}: {reason}")]
    StorageRead { key: String, reason: String },

    #[error("Storage write failed for key {key}: {reason}")]
    StorageWrite { key: String, reason: String },

    // Offline cache errors
    #[error("Invalid manifest: {0}")]
    ManifestInvalid(String),

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Offline install of {cache} failed at {url}: {reason}")]
    InstallFailed {
        cache: String,
        url: String,
        reason: String,
    },

    #[error("Cache backend error: {0}")]
    CacheBackend(String),

    // Network errors
    #[error("Network request to {url} failed: {reason}")]
    Network { url: String, reason: String },

    // Catalog errors
    #[error("Product not found in catalog: {0}")]
    ProductNotFound(String),

    // Order form errors
    #[error("PDF generation not available")]
    PdfUnavailable,

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),

    // Validation errors
    #[error("{0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("{0}")]
    User(String),
}

impl ProcurementError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a network error for a URL
    pub fn network(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Network {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Check if retrying the same operation can succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InstallFailed { .. } | Self::Network { .. } | Self::StorageWrite { .. }
        )
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::InstallFailed { .. } => {
                Some("Every manifest entry must be reachable. Fix the failing URL and rerun: mhp offline install")
            }
            Self::PdfUnavailable => Some("Rebuild with the `pdf` feature enabled"),
            Self::ConfigInvalid { .. } => Some("Run: mhp config init --force"),
            Self::ConfigKeyUnknown(_) => Some("Run: mhp config show"),
            Self::ProductNotFound(_) => Some("Run: mhp catalog list"),
            _ => None,
        }
    }
}
