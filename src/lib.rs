//! MH Procurement - order list and offline catalog
//!
//! Client core of the Municipal Hospital procurement catalog: a persistent
//! order list ("cart"), the product catalog with search, the contact form,
//! a PDF order form export and a cache-first offline controller that mirrors
//! the catalog site's assets.

pub mod cart;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod contact;
pub mod error;
pub mod notify;
pub mod offline;
pub mod order_form;
pub mod ui;

pub use error::{ProcurementError, ProcurementResult};
