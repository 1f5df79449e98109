//! Cart command - show and change the order list

use crate::cart::{CartCommand, CartStore, FileStore, ItemInput};
use crate::catalog::Catalog;
use crate::cli::args::{CartAction, CartArgs, ItemArgs, OutputFormat};
use crate::config::{Config, ConfigManager};
use crate::error::ProcurementResult;
use crate::order_form::format_currency;
use crate::ui::{self, ConsoleView, UiContext};

/// Order list backed by the configured storage directory
pub(crate) fn open_store<'v>(
    config: &Config,
    view: &'v ConsoleView,
) -> CartStore<FileStore, &'v ConsoleView> {
    let storage = FileStore::new(ConfigManager::storage_dir(config));
    let mut store = CartStore::new(storage, view).with_key(config.storage.cart_key.clone());
    store.init();
    store
}

/// Execute the cart command
pub async fn execute(args: CartArgs, config: &Config) -> ProcurementResult<()> {
    let ctx = UiContext::detect();
    let view = ConsoleView::new(ctx.clone());
    let mut store = open_store(config, &view);

    let action = args.action.unwrap_or(CartAction::Show {
        format: OutputFormat::Table,
    });

    match action {
        CartAction::Show { format } => show(&ctx, &store, format)?,
        CartAction::Add { id, quantity } => {
            let catalog = Catalog::load(config.catalog.path.as_deref()).await?;
            let product = catalog.require(&id)?;
            store.dispatch(CartCommand::Add(product.to_input(&quantity)));
        }
        CartAction::AddItem(item) => store.dispatch(CartCommand::Add(item_input(item))),
        CartAction::Remove { id } => {
            if store.remove_item(&id).is_none() {
                ui::remark(&ctx, &format!("{} is not in the order list", id));
            }
        }
        CartAction::Update { id, quantity } => {
            if !store.update_quantity(&id, &quantity) {
                ui::remark(&ctx, &format!("{} is not in the order list", id));
            }
        }
        CartAction::Clear { yes } => {
            let ctx = ctx.with_auto_yes(yes);
            if ui::confirm(&ctx, "Clear the order list?", true).await? {
                store.dispatch(CartCommand::Clear);
            } else {
                ui::remark(&ctx, "Order list left unchanged");
            }
        }
        CartAction::Total => println!("{}", format_currency(store.total())),
    }

    Ok(())
}

fn item_input(args: ItemArgs) -> ItemInput {
    ItemInput::new(args.id, args.name)
        .price(args.price)
        .quantity(args.quantity)
        .category(args.category)
        .description(args.description)
}

fn show(
    ctx: &UiContext,
    store: &CartStore<FileStore, &ConsoleView>,
    format: OutputFormat,
) -> ProcurementResult<()> {
    match format {
        OutputFormat::Table => {
            ui::intro(ctx, "Order List");
            ui::render_table(ctx, &store.summary());
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(store.items())?),
        OutputFormat::Plain => {
            for item in store.items() {
                println!("{}\t{}", item.id, item.quantity);
            }
        }
    }
    Ok(())
}
