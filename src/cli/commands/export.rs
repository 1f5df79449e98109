//! Export command - write the order list as a PDF order form

use super::cart::open_store;
use crate::cli::args::ExportArgs;
use crate::config::Config;
use crate::error::{ProcurementError, ProcurementResult};
use crate::offline::HttpNetwork;
use crate::order_form::{default_surface, OrderForm, OrderFormExporter};
use crate::ui::{self, ConsoleView, UiContext};
use std::path::PathBuf;
use std::time::Duration;

/// Execute the export command
pub async fn execute(args: ExportArgs, config: &Config) -> ProcurementResult<()> {
    let ctx = UiContext::detect();
    let view = ConsoleView::new(ctx.clone());
    let store = open_store(config, &view);

    let mut form = OrderForm::from_config(config);
    if args.no_logo {
        form.logo_url = None;
    }

    let dir = match args.output_dir.or_else(|| config.order_form.output_dir.clone()) {
        Some(dir) => dir,
        None => std::env::current_dir()
            .map_err(|e| ProcurementError::io("getting current directory", e))?,
    };
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|e| ProcurementError::io(format!("creating {}", dir.display()), e))?;

    let network = HttpNetwork::new(Duration::from_secs(config.offline.timeout_secs));
    let exporter = OrderFormExporter::new(form, network);
    let mut surface = default_surface(&exporter.form().title);

    let path: PathBuf = exporter
        .export(surface.as_deref_mut(), store.items(), &dir, &view)
        .await?;

    ui::key_value(&ctx, "Saved", &path.display().to_string());
    Ok(())
}
