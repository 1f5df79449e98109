//! Product catalog
//!
//! Stands in for the product cards on the category pages: each product
//! carries the fields the "add to order list" buttons read.

use crate::cart::{sanitize_input, ItemInput};
use crate::error::{ProcurementError, ProcurementResult};
use crate::notify::{NoticeLevel, Notifier};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

const BUILTIN_CATALOG: &str = include_str!("builtin.toml");

/// A catalog product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
}

impl Product {
    /// Item payload for an add command
    pub fn to_input(&self, quantity: &str) -> ItemInput {
        ItemInput::new(&self.id, &self.name)
            .price(self.price.to_string())
            .quantity(quantity)
            .category(&self.category)
            .description(&self.description)
    }

    fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
            || self.category.to_lowercase().contains(needle)
    }
}

/// Ordered product list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Catalog {
    /// The sample catalog compiled into the binary
    pub fn builtin() -> ProcurementResult<Self> {
        Self::parse(BUILTIN_CATALOG)
    }

    /// Load a catalog file, or the built-in catalog when no path is given
    pub async fn load(path: Option<&Path>) -> ProcurementResult<Self> {
        match path {
            Some(path) => {
                debug!("Loading catalog from {}", path.display());
                let content = tokio::fs::read_to_string(path).await.map_err(|e| {
                    ProcurementError::io(format!("reading catalog {}", path.display()), e)
                })?;
                Self::parse(&content)
            }
            None => Self::builtin(),
        }
    }

    pub fn parse(content: &str) -> ProcurementResult<Self> {
        let catalog: Self = toml::from_str(content)?;
        Ok(catalog)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn find(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|product| product.id == id)
    }

    /// Like [`Catalog::find`] but an unknown id is an error
    pub fn require(&self, id: &str) -> ProcurementResult<&Product> {
        self.find(id)
            .ok_or_else(|| ProcurementError::ProductNotFound(id.to_string()))
    }

    /// Distinct categories in catalog order
    pub fn categories(&self) -> Vec<&str> {
        let mut categories: Vec<&str> = Vec::new();
        for product in &self.products {
            if !categories.contains(&product.category.as_str()) {
                categories.push(&product.category);
            }
        }
        categories
    }

    /// Case-insensitive substring search over name, description and category.
    ///
    /// Returns `None` for a blank query. A search with no matches emits a
    /// warning notice.
    pub fn search<N: Notifier + ?Sized>(&self, query: &str, notifier: &N) -> Option<SearchOutcome<'_>> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        let needle = query.to_lowercase();
        let matches: Vec<&Product> = self
            .products
            .iter()
            .filter(|product| product.matches(&needle))
            .collect();

        let outcome = SearchOutcome {
            query: sanitize_input(query),
            matches,
        };

        if outcome.matches.is_empty() {
            notifier.notify(
                NoticeLevel::Warning,
                &format!("No products found for \"{}\"", outcome.query),
            );
        }

        Some(outcome)
    }
}

/// Result of a catalog search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome<'a> {
    /// The query as displayed, HTML-escaped
    pub query: String,
    pub matches: Vec<&'a Product>,
}

impl SearchOutcome<'_> {
    /// Result count line shown above the product list
    pub fn summary(&self) -> String {
        format!(
            "Found {} items matching \"{}\"",
            self.matches.len(),
            self.query
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::NoticeLog;

    fn catalog() -> Catalog {
        Catalog::parse(
            r#"
[[products]]
id = "A1"
name = "Gauze"
price = 5.5
category = "Medical Supplies"
description = "Sterile pads"

[[products]]
id = "B2"
name = "Gloves"
price = 3.0
category = "Medical Supplies"
description = "Nitrile, box of 100"

[[products]]
id = "C3"
name = "Copy Paper"
price = 27.5
category = "Office Supplies"
"#,
        )
        .unwrap()
    }

    #[test]
    fn builtin_catalog_parses() {
        let catalog = Catalog::builtin().unwrap();
        assert!(catalog.products().len() >= 10);
        assert!(catalog.find("MS-001").is_some());
        assert_eq!(
            catalog.categories(),
            vec![
                "Medical Supplies",
                "Pharmaceuticals",
                "Lab Equipment",
                "Office Supplies"
            ]
        );
    }

    #[test]
    fn search_matches_any_field_case_insensitively() {
        let catalog = catalog();
        let log = NoticeLog::new();

        let outcome = catalog.search("  MEDICAL ", &log).unwrap();
        assert_eq!(outcome.matches.len(), 2);
        assert_eq!(outcome.summary(), "Found 2 items matching \"MEDICAL\"");

        let outcome = catalog.search("nitrile", &log).unwrap();
        assert_eq!(outcome.matches[0].id, "B2");
        assert!(log.is_empty());
    }

    #[test]
    fn search_without_matches_warns() {
        let catalog = catalog();
        let log = NoticeLog::new();

        let outcome = catalog.search("scalpel", &log).unwrap();
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.summary(), "Found 0 items matching \"scalpel\"");

        let notice = log.last().unwrap();
        assert_eq!(notice.level, NoticeLevel::Warning);
        assert_eq!(notice.message, "No products found for \"scalpel\"");
    }

    #[test]
    fn blank_search_is_noop() {
        let catalog = catalog();
        let log = NoticeLog::new();
        assert!(catalog.search("   ", &log).is_none());
        assert!(log.is_empty());
    }

    #[test]
    fn search_query_is_escaped_for_display() {
        let catalog = catalog();
        let log = NoticeLog::new();
        let outcome = catalog.search("<b>", &log).unwrap();
        assert_eq!(outcome.query, "&lt;b&gt;");
    }

    #[test]
    fn product_to_input() {
        let catalog = catalog();
        let item = catalog.require("A1").unwrap().to_input("2").into_item();
        assert_eq!(item.price, 5.5);
        assert_eq!(item.quantity, 2);
        assert_eq!(item.category, "Medical Supplies");
    }

    #[test]
    fn unknown_product_errors() {
        let catalog = catalog();
        let result = catalog.require("Z9");
        assert!(matches!(result, Err(ProcurementError::ProductNotFound(_))));
    }

    #[tokio::test]
    async fn load_from_file() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("catalog.toml");
        std::fs::write(&path, "[[products]]\nid = \"X\"\nname = \"Thing\"\nprice = 1.0\n").unwrap();

        let catalog = Catalog::load(Some(&path)).await.unwrap();
        assert_eq!(catalog.products().len(), 1);
        assert_eq!(catalog.products()[0].category, "");
    }
}
