//! Configuration schema
//!
//! Configuration is stored at `~/.config/mh-procurement/config.toml`

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Hospital and department identity
    pub organization: OrganizationConfig,

    /// Order list persistence
    pub storage: StorageConfig,

    /// Offline asset cache
    pub offline: OfflineConfig,

    /// Order form export
    pub order_form: OrderFormConfig,

    /// Product catalog
    pub catalog: CatalogConfig,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Enable verbose logging
    pub verbose: bool,

    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            log_format: "text".to_string(),
        }
    }
}

/// Hospital, department and contact details printed on order forms
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrganizationConfig {
    pub hospital_name: String,
    pub department_name: String,
    pub contact_email: String,
    pub contact_phone: String,

    /// Site version reported at startup
    pub version: String,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            hospital_name: "Municipal Hospital".to_string(),
            department_name: "Outpatient Services Department".to_string(),
            contact_email: "procurement@municipalhospital.org".to_string(),
            contact_phone: "+1 (555) 123-4567".to_string(),
            version: "1.0.0".to_string(),
        }
    }
}

/// Order list storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Storage directory (defaults to the state directory)
    pub dir: Option<PathBuf>,

    /// Key the order list is stored under
    pub cart_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            cart_key: crate::cart::CART_STORAGE_KEY.to_string(),
        }
    }
}

/// Offline cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OfflineConfig {
    /// URL the relative manifest entries and requests resolve against
    pub scope_url: String,

    /// Manifest file to use instead of the built-in asset list
    pub manifest: Option<PathBuf>,

    /// Cache directory (defaults to the state directory)
    pub cache_dir: Option<PathBuf>,

    /// Per-request network timeout in seconds
    pub timeout_secs: u64,
}

impl Default for OfflineConfig {
    fn default() -> Self {
        Self {
            scope_url: "https://suboimaurice.github.io/mh-procurement-portal/".to_string(),
            manifest: None,
            cache_dir: None,
            timeout_secs: 30,
        }
    }
}

/// Order form export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderFormConfig {
    /// Document title
    pub title: String,

    /// Output file name
    pub file_name: String,

    /// Logo drawn in the footer; fetch failures are ignored
    pub logo_url: Option<String>,

    /// Output directory (defaults to the current directory)
    pub output_dir: Option<PathBuf>,
}

impl Default for OrderFormConfig {
    fn default() -> Self {
        Self {
            title: "Municipal Hospital - Procurement Order Form".to_string(),
            file_name: "MH_Procurement_Order_Form.pdf".to_string(),
            logo_url: Some(
                "https://suboimaurice.github.io/mh-procurement-portal/assets/images/logo.png"
                    .to_string(),
            ),
            output_dir: None,
        }
    }
}

/// Product catalog settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Catalog file to use instead of the built-in sample catalog
    pub path: Option<PathBuf>,
}
