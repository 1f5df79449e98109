//! Order list state machine
//!
//! [`CartStore`] owns the canonical item list. Every mutation persists the
//! list through the injected [`KeyValueStore`] and then refreshes the
//! injected [`CartView`]. Persistence is best effort: a failed write is
//! logged and the in-memory list stays authoritative.

use super::item::{CartItem, ItemInput};
use super::sanitize::{coerce_quantity, sanitize_input};
use super::storage::KeyValueStore;
use crate::notify::{NoticeLevel, Notifier};
use tracing::{debug, error, warn};

/// Storage key the order list lives under
pub const CART_STORAGE_KEY: &str = "mh_procurement_cart";

/// What a view needs to render the order list
#[derive(Debug, Clone, Copy)]
pub struct CartSummary<'a> {
    pub items: &'a [CartItem],
    /// Sum of quantities (the badge count)
    pub item_count: u64,
    pub total: f64,
}

/// Display port: re-render on every change and show notices
pub trait CartView: Notifier {
    fn refresh(&self, summary: &CartSummary<'_>);
}

impl<V: CartView + ?Sized> CartView for &V {
    fn refresh(&self, summary: &CartSummary<'_>) {
        (**self).refresh(summary)
    }
}

/// Commands the page (or CLI) dispatches against the order list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartCommand {
    Add(ItemInput),
    Remove { id: String },
    UpdateQuantity { id: String, quantity: String },
    Clear,
}

/// The order list
pub struct CartStore<S, V> {
    items: Vec<CartItem>,
    storage: S,
    view: V,
    key: String,
}

impl<S: KeyValueStore, V: CartView> CartStore<S, V> {
    /// Create an empty store; call [`CartStore::init`] to hydrate it
    pub fn new(storage: S, view: V) -> Self {
        Self {
            items: Vec::new(),
            storage,
            view,
            key: CART_STORAGE_KEY.to_string(),
        }
    }

    /// Use a different storage key
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = key.into();
        self
    }

    /// Hydrate from storage and render. Never fails: unreadable or corrupt
    /// storage yields an empty list.
    pub fn init(&mut self) {
        self.items = self.load();
        debug!("Order list hydrated with {} item(s)", self.items.len());
        self.refresh();
    }

    /// Apply a dispatched command
    pub fn dispatch(&mut self, command: CartCommand) {
        match command {
            CartCommand::Add(input) => self.add_item(input),
            CartCommand::Remove { id } => {
                self.remove_item(&id);
            }
            CartCommand::UpdateQuantity { id, quantity } => {
                self.update_quantity(&id, &quantity);
            }
            CartCommand::Clear => self.clear_all(),
        }
    }

    /// Add an item, or bump the quantity of the entry with the same id.
    ///
    /// An existing entry keeps its name and price.
    pub fn add_item(&mut self, input: ItemInput) {
        let item = input.into_item();
        let name = item.name.clone();

        match self.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => {
                existing.quantity = existing.quantity.saturating_add(item.quantity);
                debug!("Increased {} to quantity {}", existing.id, existing.quantity);
            }
            None => {
                debug!("Added {} with quantity {}", item.id, item.quantity);
                self.items.push(item);
            }
        }

        self.save();
        self.refresh();
        self.view.notify(
            NoticeLevel::Success,
            &format!("{} added to order list", name),
        );
    }

    /// Remove the entry with `id`; returns it, or `None` (and does nothing)
    /// if it is not in the list
    pub fn remove_item(&mut self, id: &str) -> Option<CartItem> {
        let index = self.position(id)?;
        let removed = self.items.remove(index);

        self.save();
        self.refresh();
        self.view.notify(
            NoticeLevel::Info,
            &format!("{} removed from order list", removed.name),
        );
        Some(removed)
    }

    /// Set the quantity of the entry with `id`, floored at 1.
    ///
    /// Returns false (and does nothing) if the entry is absent.
    pub fn update_quantity(&mut self, id: &str, quantity: &str) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };

        self.items[index].quantity = coerce_quantity(quantity);
        self.save();
        self.refresh();
        true
    }

    /// Empty the list unconditionally
    pub fn clear_all(&mut self) {
        self.items.clear();
        self.save();
        self.refresh();
        self.view.notify(NoticeLevel::Info, "Order list cleared");
    }

    /// Sum of price times quantity; 0 for an empty list
    pub fn total(&self) -> f64 {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Sum of quantities
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Items in insertion order
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn summary(&self) -> CartSummary<'_> {
        CartSummary {
            items: &self.items,
            item_count: self.item_count(),
            total: self.total(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    /// Read the persisted list, falling back to an empty one
    pub fn load(&self) -> Vec<CartItem> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to load order list from storage: {}", e);
                return Vec::new();
            }
        };

        // Decode record by record; a bad entry is skipped, not the whole list
        let stored: Option<Vec<serde_json::Value>> = match serde_json::from_str(&raw) {
            Ok(stored) => stored,
            Err(e) => {
                warn!("Stored order list is not valid, starting empty: {}", e);
                return Vec::new();
            }
        };

        let mut items: Vec<CartItem> = Vec::new();
        for record in stored.unwrap_or_default() {
            let item = match serde_json::from_value::<CartItem>(record) {
                Ok(item) => item.normalized(),
                Err(e) => {
                    warn!("Skipping invalid stored order list entry: {}", e);
                    continue;
                }
            };
            match items.iter_mut().find(|existing| existing.id == item.id) {
                Some(existing) => {
                    debug!("Merging duplicate stored entry {}", item.id);
                    existing.quantity = existing.quantity.saturating_add(item.quantity);
                }
                None => items.push(item),
            }
        }
        items
    }

    /// Persist the list; failures are logged, never raised
    fn save(&self) {
        let json = match serde_json::to_string(&self.items) {
            Ok(json) => json,
            Err(e) => {
                error!("Failed to serialize order list: {}", e);
                return;
            }
        };

        if let Err(e) = self.storage.set(&self.key, &json) {
            error!("Failed to save order list to storage: {}", e);
        }
    }

    fn refresh(&self) {
        self.view.refresh(&self.summary());
    }

    /// Ids are stored escaped; accept either the stored or the raw form
    fn position(&self, id: &str) -> Option<usize> {
        if let Some(index) = self.items.iter().position(|item| item.id == id) {
            return Some(index);
        }
        let escaped = sanitize_input(id);
        self.items.iter().position(|item| item.id == escaped)
    }
}
