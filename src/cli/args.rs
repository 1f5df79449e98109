//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// MH Procurement - order list and offline catalog for the Municipal Hospital
/// outpatient department
///
/// Keeps a persistent order list of catalog items, exports it as a PDF order
/// form and mirrors the catalog site into an offline cache.
#[derive(Parser, Debug)]
#[command(name = "mhp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "MHP_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show and change the order list
    Cart(CartArgs),

    /// Browse and search the product catalog
    Catalog(CatalogArgs),

    /// Send a message to the procurement office
    Contact(ContactArgs),

    /// Export the order list as a PDF order form
    Export(ExportArgs),

    /// Manage the offline asset cache
    Offline(OfflineArgs),

    /// Show or edit configuration
    Config(ConfigArgs),
}

#[derive(Parser, Debug)]
pub struct CartArgs {
    #[command(subcommand)]
    pub action: Option<CartAction>,
}

#[derive(Subcommand, Debug)]
pub enum CartAction {
    /// Show the order list
    Show {
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Add a catalog product by id
    Add {
        /// Catalog product id
        id: String,

        /// Quantity; non-numeric or values below 1 count as 1
        #[arg(short, long, default_value = "1", allow_hyphen_values = true)]
        quantity: String,
    },

    /// Add an item that is not in the catalog
    AddItem(ItemArgs),

    /// Remove an item
    Remove {
        id: String,
    },

    /// Set an item's quantity
    Update {
        id: String,

        /// New quantity; non-numeric or values below 1 become 1
        #[arg(allow_hyphen_values = true)]
        quantity: String,
    },

    /// Empty the order list
    Clear {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the order total
    Total,
}

/// Raw item fields, read the same way as a product card's data attributes
#[derive(Parser, Debug)]
pub struct ItemArgs {
    #[arg(long)]
    pub id: String,

    #[arg(long)]
    pub name: String,

    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    pub price: String,

    #[arg(short, long, default_value = "1", allow_hyphen_values = true)]
    pub quantity: String,

    #[arg(long, default_value = "")]
    pub category: String,

    #[arg(long, default_value = "")]
    pub description: String,
}

#[derive(Parser, Debug)]
pub struct CatalogArgs {
    #[command(subcommand)]
    pub action: Option<CatalogAction>,
}

#[derive(Subcommand, Debug)]
pub enum CatalogAction {
    /// List products
    List {
        /// Only this category (case-insensitive)
        #[arg(long)]
        category: Option<String>,

        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },

    /// Search names, descriptions and categories
    Search {
        query: String,
    },

    /// Show one product
    Show {
        id: String,
    },
}

#[derive(Parser, Debug)]
pub struct ContactArgs {
    #[arg(long, default_value = "")]
    pub name: String,

    #[arg(long, default_value = "")]
    pub email: String,

    #[arg(long, default_value = "")]
    pub message: String,
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Directory to write the PDF into (defaults to order_form.output_dir,
    /// then the current directory)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Do not fetch or draw the logo
    #[arg(long)]
    pub no_logo: bool,
}

#[derive(Parser, Debug)]
pub struct OfflineArgs {
    #[command(subcommand)]
    pub action: OfflineAction,
}

#[derive(Subcommand, Debug)]
pub enum OfflineAction {
    /// Populate the offline cache from the manifest
    Install {
        /// Manifest file (defaults to offline.manifest, then the built-in list)
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },

    /// Request a URL through the offline cache
    Fetch {
        /// Absolute URL, or a path relative to the scope URL
        url: String,

        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Write the body to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List caches and their entries
    Caches {
        /// Also list every cached URL
        #[arg(short, long)]
        entries: bool,
    },

    /// Print the manifest in use
    Manifest {
        /// Manifest file (defaults to offline.manifest, then the built-in list)
        #[arg(short, long)]
        manifest: Option<PathBuf>,
    },

    /// Show whether the cache controller is active
    Status,
}

#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: Option<ConfigAction>,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write the default configuration
    Init {
        /// Overwrite existing configuration
        #[arg(short, long)]
        force: bool,
    },

    /// Set a configuration value
    Set {
        /// Configuration key (e.g., organization.contact_phone)
        key: String,
        value: String,
    },
}

/// Output format for listings
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
    /// One id per line
    Plain,
}
