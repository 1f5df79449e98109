//! Offline command - install, query and inspect the offline cache

use crate::cli::args::{OfflineAction, OfflineArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{ProcurementError, ProcurementResult};
use crate::offline::{
    CacheStorage, DiskCacheStorage, HttpNetwork, Manifest, OfflineCacheController, Request,
    WorkerRegistration, WorkerState,
};
use crate::ui::{self, InstallProgress, TaskSpinner, UiContext};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

type Controller = OfflineCacheController<DiskCacheStorage, HttpNetwork>;

/// Execute the offline command
pub async fn execute(args: OfflineArgs, config: &Config) -> ProcurementResult<()> {
    let ctx = UiContext::detect();

    match args.action {
        OfflineAction::Install { manifest } => install(&ctx, config, manifest.as_deref()).await,
        OfflineAction::Fetch {
            url,
            method,
            output,
        } => fetch(&ctx, config, &url, &method, output).await,
        OfflineAction::Caches { entries } => caches(&ctx, config, entries).await,
        OfflineAction::Manifest { manifest } => show_manifest(&ctx, config, manifest.as_deref()).await,
        OfflineAction::Status => status(&ctx, config).await,
    }
}

fn scope_url(config: &Config) -> ProcurementResult<Url> {
    Url::parse(&config.offline.scope_url).map_err(|e| ProcurementError::InvalidUrl {
        url: config.offline.scope_url.clone(),
        reason: e.to_string(),
    })
}

async fn load_manifest(config: &Config, path: Option<&Path>) -> ProcurementResult<Manifest> {
    match path.or(config.offline.manifest.as_deref()) {
        Some(path) => {
            debug!("Using manifest {}", path.display());
            Manifest::from_file(path).await
        }
        None => Ok(Manifest::builtin()),
    }
}

/// Controller restored to the state recorded by the last successful install
async fn controller(config: &Config, manifest: Manifest) -> ProcurementResult<Controller> {
    let scope = scope_url(config)?;
    let dir = ConfigManager::cache_dir(config);
    let network = HttpNetwork::new(Duration::from_secs(config.offline.timeout_secs));

    let state = match WorkerRegistration::load(&dir).await? {
        Some(registration) if registration.controls(scope.as_str()) => WorkerState::Active,
        _ => WorkerState::Uninstalled,
    };
    debug!("Offline controller for {} starts {}", scope, state);

    Ok(OfflineCacheController::new(manifest, scope, DiskCacheStorage::new(dir), network).with_state(state))
}

async fn install(ctx: &UiContext, config: &Config, manifest: Option<&Path>) -> ProcurementResult<()> {
    let manifest = load_manifest(config, manifest).await?;
    let mut controller = controller(config, manifest).await?;

    ui::intro(ctx, "Offline install");
    let progress = InstallProgress::new(ctx, &controller.manifest().cache_name, controller.manifest().len());
    let result = controller
        .install_with_progress(|done, total| progress.update(done, total))
        .await;
    progress.finish();

    let report = result?;
    let dir = ConfigManager::cache_dir(config);
    WorkerRegistration::from_report(controller.scope().as_str(), &report)
        .save(&dir)
        .await?;

    info!("Offline cache {} ready", report.cache_name);
    ui::step_ok_detail(
        ctx,
        &format!("Cached {} entries into {}", report.entries, report.cache_name),
        &format!("{} bytes", report.bytes),
    );
    ui::outro_success(ctx, "Offline cache installed");
    Ok(())
}

async fn fetch(
    ctx: &UiContext,
    config: &Config,
    url: &str,
    method: &str,
    output: Option<PathBuf>,
) -> ProcurementResult<()> {
    let manifest = load_manifest(config, None).await?;
    let controller = controller(config, manifest).await?;

    let request = Request::resolve(controller.scope(), url)?.with_method(method);

    // Raw bodies go to stdout, so only show a spinner when writing a file
    let mut spinner = output.as_ref().map(|_| TaskSpinner::new(ctx));
    if let Some(spinner) = spinner.as_mut() {
        spinner.start(&format!("Fetching {}", request.url));
    }

    let fetched = match controller.handle_fetch(&request).await {
        Ok(fetched) => fetched,
        Err(e) => {
            if let Some(spinner) = spinner.as_mut() {
                spinner.stop_error("Fetch failed");
            }
            if e.is_retryable() && controller.state() == WorkerState::Active {
                ui::step_warn(ctx, &format!("{} is not in the offline cache", request.url));
            }
            return Err(e);
        }
    };
    info!(
        "{} {} -> {} from {}",
        request.method, request.url, fetched.response.status, fetched.source
    );

    match (output, spinner) {
        (Some(path), Some(mut spinner)) => {
            tokio::fs::write(&path, &fetched.response.body)
                .await
                .map_err(|e| ProcurementError::io(format!("writing {}", path.display()), e))?;
            spinner.stop(&format!(
                "HTTP {} from {} ({})",
                fetched.response.status,
                fetched.source,
                path.display()
            ));
        }
        _ => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(&fetched.response.body)
                .and_then(|_| stdout.flush())
                .map_err(|e| ProcurementError::io("writing response body", e))?;
        }
    }

    Ok(())
}

async fn caches(ctx: &UiContext, config: &Config, entries: bool) -> ProcurementResult<()> {
    let storage = DiskCacheStorage::new(ConfigManager::cache_dir(config));
    let names = storage.keys().await?;

    if names.is_empty() {
        ui::step_info(ctx, "No offline caches");
        return Ok(());
    }

    let current = load_manifest(config, None).await?.cache_name;
    ui::section(ctx, "Offline caches");
    for name in names {
        let urls = storage.entries(&name).await?;
        ui::key_value_status(
            ctx,
            &name,
            &format!("{} entries", urls.len()),
            name == current,
        );
        if entries {
            for url in urls {
                println!("    {}", url);
            }
        }
    }

    Ok(())
}

async fn show_manifest(ctx: &UiContext, config: &Config, path: Option<&Path>) -> ProcurementResult<()> {
    let manifest = load_manifest(config, path).await?;
    let requests = manifest.requests(&scope_url(config)?)?;

    ui::section(ctx, &manifest.cache_name);
    for request in requests {
        println!("  {}", request.url);
    }
    println!();
    println!("{} entries", manifest.len());
    Ok(())
}

async fn status(ctx: &UiContext, config: &Config) -> ProcurementResult<()> {
    let dir = ConfigManager::cache_dir(config);
    let scope = scope_url(config)?;

    ui::section(ctx, "Offline cache");
    ui::key_value(ctx, "Scope", scope.as_str());
    ui::key_value(ctx, "Directory", &dir.display().to_string());

    match WorkerRegistration::load(&dir).await? {
        Some(registration) => {
            let active = registration.controls(scope.as_str());
            ui::key_value_status(ctx, "State", &registration.state.to_string(), active);
            ui::key_value(ctx, "Cache", &registration.cache_name);
            ui::key_value(ctx, "Entries", &registration.entries.to_string());
            ui::key_value(
                ctx,
                "Installed",
                &registration.installed_at.format("%Y-%m-%d %H:%M").to_string(),
            );
            if !active {
                ui::step_warn_hint(
                    ctx,
                    &format!("Installed for a different scope: {}", registration.scope),
                    "Run: mhp offline install",
                );
            }
        }
        None => {
            ui::key_value_status(ctx, "State", &WorkerState::Uninstalled.to_string(), false);
            ui::remark(ctx, "Run: mhp offline install");
        }
    }

    Ok(())
}
