//! Client-side order list
//!
//! The order list ("cart") is a deduplicated-by-id, insertion-ordered list of
//! catalog items. It is hydrated from key-value storage on startup, written
//! back after every change, and re-rendered through a view port.
//!
//! # Failure policy
//!
//! | Failure | Outcome |
//! |---------|---------|
//! | Missing, corrupt or unreadable storage | Empty list, warning logged |
//! | Write failure (quota, permissions) | Logged; memory stays authoritative |
//! | Non-numeric price / quantity | 0 / 1 |

pub mod item;
pub mod sanitize;
pub mod storage;
pub mod store;

pub use item::{CartItem, ItemInput};
pub use sanitize::sanitize_input;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::{CartCommand, CartStore, CartSummary, CartView, CART_STORAGE_KEY};
