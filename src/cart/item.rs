//! Order list records and the raw input they are built from

use super::sanitize::{coerce_price, coerce_quantity, sanitize_input};
use serde::{Deserialize, Deserializer, Serialize};

/// One line of the order list, as persisted and rendered
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// Catalog identifier, unique within the order list
    pub id: String,
    pub name: String,
    /// Unit price, never negative
    #[serde(default, deserialize_with = "loose_price")]
    pub price: f64,
    /// Always at least 1
    #[serde(default = "default_quantity", deserialize_with = "loose_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
}

impl CartItem {
    /// Price times quantity
    pub fn line_total(&self) -> f64 {
        self.price * f64::from(self.quantity)
    }

    /// Restore the numeric invariants on a record read back from storage
    pub(crate) fn normalized(mut self) -> Self {
        if !self.price.is_finite() || self.price < 0.0 {
            self.price = 0.0;
        }
        self.quantity = self.quantity.max(1);
        self
    }
}

/// Unvalidated item fields as they arrive from the page or the command line.
///
/// Every field is text; JSON numbers are accepted and read as their textual
/// form, missing fields are empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemInput {
    #[serde(default, deserialize_with = "loose_string")]
    pub id: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub name: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub price: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub quantity: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub category: String,
    #[serde(default, deserialize_with = "loose_string")]
    pub description: String,
}

impl ItemInput {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn price(mut self, price: impl Into<String>) -> Self {
        self.price = price.into();
        self
    }

    pub fn quantity(mut self, quantity: impl Into<String>) -> Self {
        self.quantity = quantity.into();
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sanitize text fields and coerce numbers into a storable item
    pub fn into_item(self) -> CartItem {
        CartItem {
            id: sanitize_input(&self.id),
            name: sanitize_input(&self.name),
            price: coerce_price(&self.price),
            quantity: coerce_quantity(&self.quantity),
            category: sanitize_input(&self.category),
            description: sanitize_input(&self.description),
        }
    }
}

fn default_quantity() -> u32 {
    1
}

/// Stored prices may be any JSON number or numeric text
fn loose_price<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let price = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(serde_json::Value::String(s)) => coerce_price(&s),
        _ => 0.0,
    };
    Ok(if price.is_finite() && price >= 0.0 { price } else { 0.0 })
}

/// Stored quantities may be negative, fractional or text; all floor at 1
fn loose_quantity<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let quantity = match value {
        Some(serde_json::Value::Number(n)) => match (n.as_i64(), n.as_f64()) {
            (Some(whole), _) => whole,
            (None, Some(float)) if float.is_finite() => float.trunc() as i64,
            _ => 1,
        },
        Some(serde_json::Value::String(s)) => i64::from(coerce_quantity(&s)),
        _ => 1,
    };
    Ok(u32::try_from(quantity.max(1)).unwrap_or(u32::MAX))
}

fn loose_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_into_item_coerces_fields() {
        let item = ItemInput::new("A1", "Gauze <b>roll</b>")
            .price("5.50")
            .quantity("2")
            .category("Medical Supplies")
            .into_item();

        assert_eq!(item.id, "A1");
        assert_eq!(item.name, "Gauze &lt;b&gt;roll&lt;/b&gt;");
        assert_eq!(item.price, 5.5);
        assert_eq!(item.quantity, 2);
        assert_eq!(item.description, "");
    }

    #[test]
    fn stored_numbers_are_read_leniently() {
        let items: Vec<CartItem> = serde_json::from_str(
            r#"[
                {"id":"A1","name":"Gauze","price":"5.50","quantity":2.0},
                {"id":"B2","name":"Gloves","price":-3,"quantity":-3},
                {"id":"C3","name":"Tape","price":2.25,"quantity":"4 rolls"},
                {"id":"D4","name":"Swabs","quantity":null}
            ]"#,
        )
        .unwrap();

        assert_eq!((items[0].price, items[0].quantity), (5.5, 2));
        assert_eq!((items[1].price, items[1].quantity), (0.0, 1));
        assert_eq!((items[2].price, items[2].quantity), (2.25, 4));
        assert_eq!((items[3].price, items[3].quantity), (0.0, 1));
    }

    #[test]
    fn input_defaults_on_garbage() {
        let item = ItemInput::new("X", "Thing")
            .price("free")
            .quantity("lots")
            .into_item();
        assert_eq!(item.price, 0.0);
        assert_eq!(item.quantity, 1);
    }

    #[test]
    fn input_accepts_json_numbers() {
        let input: ItemInput =
            serde_json::from_str(r#"{"id": 7, "name": "Syringe", "price": 0.35, "quantity": 100}"#)
                .unwrap();
        assert_eq!(input.id, "7");
        assert_eq!(input.price, "0.35");

        let item = input.into_item();
        assert_eq!(item.quantity, 100);
        assert_eq!(item.category, "");
    }

    #[test]
    fn item_serializes_with_page_field_names() {
        let item = ItemInput::new("B2", "Gloves").price("3").into_item();
        let json = serde_json::to_string(&item).unwrap();
        assert_eq!(
            json,
            r#"{"id":"B2","name":"Gloves","price":3.0,"quantity":1,"category":"","description":""}"#
        );
    }

    #[test]
    fn line_total() {
        let item = ItemInput::new("A1", "Gauze")
            .price("5.5")
            .quantity("2")
            .into_item();
        assert_eq!(item.line_total(), 11.0);
    }

    #[test]
    fn normalized_repairs_stored_values() {
        let item = CartItem {
            id: "Z".to_string(),
            name: "Z".to_string(),
            price: -2.0,
            quantity: 0,
            category: String::new(),
            description: String::new(),
        }
        .normalized();
        assert_eq!(item.price, 0.0);
        assert_eq!(item.quantity, 1);
    }
}
