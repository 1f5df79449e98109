//! Catalog command - list, search and show products

use crate::catalog::{Catalog, Product};
use crate::cli::args::{CatalogAction, CatalogArgs, OutputFormat};
use crate::config::Config;
use crate::error::ProcurementResult;
use crate::order_form::format_money;
use crate::ui::{self, ConsoleView, UiContext};
use console::style;

/// Execute the catalog command
pub async fn execute(args: CatalogArgs, config: &Config) -> ProcurementResult<()> {
    let ctx = UiContext::detect();
    let catalog = Catalog::load(config.catalog.path.as_deref()).await?;

    let action = args.action.unwrap_or(CatalogAction::List {
        category: None,
        format: OutputFormat::Table,
    });

    match action {
        CatalogAction::List { category, format } => {
            let products: Vec<&Product> = catalog
                .products()
                .iter()
                .filter(|product| {
                    category
                        .as_deref()
                        .map_or(true, |wanted| product.category.eq_ignore_ascii_case(wanted))
                })
                .collect();

            match format {
                OutputFormat::Table => {
                    ui::intro(&ctx, "Catalog");
                    print_table(&products);
                }
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&products)?),
                OutputFormat::Plain => {
                    for product in products {
                        println!("{}", product.id);
                    }
                }
            }
        }
        CatalogAction::Search { query } => {
            let view = ConsoleView::new(ctx.clone());
            match catalog.search(&query, &view) {
                Some(outcome) => {
                    ui::step_info(&ctx, &outcome.summary());
                    if !outcome.matches.is_empty() {
                        print_table(&outcome.matches);
                    }
                }
                None => ui::remark(&ctx, "Enter a search term"),
            }
        }
        CatalogAction::Show { id } => {
            let product = catalog.require(&id)?;
            ui::section(&ctx, &product.name);
            ui::key_value(&ctx, "ID", &product.id);
            ui::key_value(&ctx, "Category", &product.category);
            ui::key_value(&ctx, "Price", &format_money(product.price));
            ui::key_value(&ctx, "Description", &product.description);
        }
    }

    Ok(())
}

fn print_table(products: &[&Product]) {
    println!(
        "{:<8} {:<44} {:<18} {:>10}",
        style("ID").bold(),
        style("NAME").bold(),
        style("CATEGORY").bold(),
        style("PRICE").bold()
    );
    println!("{}", "-".repeat(83));

    for product in products {
        let name: String = product.name.chars().take(44).collect();
        println!(
            "{:<8} {:<44} {:<18} {:>10}",
            product.id,
            name,
            product.category,
            format_money(product.price)
        );
    }

    println!();
    println!("{} product(s)", products.len());
}
