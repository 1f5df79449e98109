//! Terminal rendering of the order list

use super::context::UiContext;
use super::output::{self, key_value};
use crate::cart::{CartSummary, CartView};
use crate::notify::{NoticeLevel, Notifier};
use crate::order_form::{format_currency, format_money};
use console::style;
use std::cell::Cell;

/// Prints notices and a one-line badge after every order list change.
///
/// The refresh that follows hydration is not printed; commands that want
/// the full list call [`render_table`].
pub struct ConsoleView {
    ctx: UiContext,
    hydrated: Cell<bool>,
}

impl ConsoleView {
    pub fn new(ctx: UiContext) -> Self {
        Self {
            ctx,
            hydrated: Cell::new(false),
        }
    }
}

impl Notifier for ConsoleView {
    fn notify(&self, level: NoticeLevel, message: &str) {
        output::notice(&self.ctx, level, message);
    }
}

impl CartView for ConsoleView {
    fn refresh(&self, summary: &CartSummary<'_>) {
        if !self.hydrated.replace(true) {
            return;
        }
        key_value(&self.ctx, "Order list", &badge(summary));
    }
}

/// `3 items, $21.50`
pub fn badge(summary: &CartSummary<'_>) -> String {
    let noun = if summary.item_count == 1 { "item" } else { "items" };
    format!(
        "{} {}, {}",
        summary.item_count,
        noun,
        format_currency(summary.total)
    )
}

/// Print the order list as a table
pub fn render_table(ctx: &UiContext, summary: &CartSummary<'_>) {
    if summary.items.is_empty() {
        output::remark(ctx, "Your order list is empty");
        return;
    }

    let id_width = summary
        .items
        .iter()
        .map(|item| item.id.chars().count())
        .max()
        .unwrap_or(2)
        .max(2);
    let name_width = summary
        .items
        .iter()
        .map(|item| item.name.chars().count())
        .max()
        .unwrap_or(4)
        .clamp(4, 48);

    println!(
        "  {:<id_width$}  {:<name_width$}  {:>5}  {:>12}  {:>12}",
        style("ID").bold(),
        style("Item").bold(),
        style("Qty").bold(),
        style("Unit Price").bold(),
        style("Total").bold(),
    );
    for item in summary.items {
        let name: String = item.name.chars().take(name_width).collect();
        println!(
            "  {:<id_width$}  {:<name_width$}  {:>5}  {:>12}  {:>12}",
            item.id,
            name,
            item.quantity,
            format_money(item.price),
            format_money(item.line_total()),
        );
    }
    println!();
    key_value(ctx, "Total", &badge(summary));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::CartItem;

    fn item(quantity: u32) -> CartItem {
        CartItem {
            id: "A1".to_string(),
            name: "Gauze".to_string(),
            price: 5.5,
            quantity,
            category: String::new(),
            description: String::new(),
        }
    }

    #[test]
    fn badge_pluralizes() {
        let items = vec![item(1)];
        let summary = CartSummary {
            items: &items,
            item_count: 1,
            total: 5.5,
        };
        assert_eq!(badge(&summary), "1 item, $5.50");

        let summary = CartSummary {
            items: &[],
            item_count: 0,
            total: 0.0,
        };
        assert_eq!(badge(&summary), "0 items, $0.00");
    }

    #[test]
    fn first_refresh_is_hydration() {
        let view = ConsoleView::new(UiContext::non_interactive());
        let items = vec![item(2)];
        let summary = CartSummary {
            items: &items,
            item_count: 2,
            total: 11.0,
        };
        view.refresh(&summary);
        assert!(view.hydrated.get());
        view.refresh(&summary);
        render_table(&UiContext::non_interactive(), &summary);
    }
}
