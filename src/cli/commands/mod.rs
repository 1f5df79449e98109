//! CLI command implementations

pub mod cart;
pub mod catalog;
pub mod config;
pub mod contact;
pub mod export;
pub mod offline;

pub use cart::execute as cart;
pub use catalog::execute as catalog;
pub use config::execute as config;
pub use contact::execute as contact;
pub use export::execute as export;
pub use offline::execute as offline;
