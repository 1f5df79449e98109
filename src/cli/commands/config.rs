//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{ProcurementError, ProcurementResult};
use crate::ui::{self, UiContext};
use std::path::PathBuf;

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> ProcurementResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => println!("{}", manager.path().display()),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => {
            let mut updated = config.clone();
            set_value(&mut updated, &key, &value)?;
            manager.save(&updated).await?;
            ui::step_ok(&UiContext::detect(), &format!("Set {} = {}", key, value));
        }
    }

    Ok(())
}

fn show_config(config: &Config) -> ProcurementResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

async fn init_config(manager: &ConfigManager, force: bool) -> ProcurementResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;
    ui::step_ok_detail(&ctx, "Configuration initialized", &path.display().to_string());
    Ok(())
}

/// Apply a dot-separated key to the configuration
fn set_value(config: &mut Config, key: &str, value: &str) -> ProcurementResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "verbose"] => config.general.verbose = parse_bool(value)?,
        ["general", "log_format"] => config.general.log_format = parse_log_format(value)?,

        ["organization", "hospital_name"] => config.organization.hospital_name = value.to_string(),
        ["organization", "department_name"] => {
            config.organization.department_name = value.to_string()
        }
        ["organization", "contact_email"] => config.organization.contact_email = value.to_string(),
        ["organization", "contact_phone"] => config.organization.contact_phone = value.to_string(),

        ["storage", "dir"] => config.storage.dir = optional_path(value),
        ["storage", "cart_key"] => config.storage.cart_key = value.to_string(),

        ["offline", "scope_url"] => config.offline.scope_url = value.to_string(),
        ["offline", "manifest"] => config.offline.manifest = optional_path(value),
        ["offline", "cache_dir"] => config.offline.cache_dir = optional_path(value),
        ["offline", "timeout_secs"] => config.offline.timeout_secs = parse_u64(value)?,

        ["order_form", "title"] => config.order_form.title = value.to_string(),
        ["order_form", "file_name"] => config.order_form.file_name = value.to_string(),
        ["order_form", "logo_url"] => {
            config.order_form.logo_url = (!value.is_empty()).then(|| value.to_string())
        }
        ["order_form", "output_dir"] => config.order_form.output_dir = optional_path(value),

        ["catalog", "path"] => config.catalog.path = optional_path(value),

        _ => return Err(ProcurementError::ConfigKeyUnknown(key.to_string())),
    }

    Ok(())
}

/// Empty value clears the setting
fn optional_path(value: &str) -> Option<PathBuf> {
    (!value.is_empty()).then(|| PathBuf::from(value))
}

fn parse_bool(value: &str) -> ProcurementResult<bool> {
    match value.to_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(ProcurementError::User(format!(
            "Invalid boolean value: {}. Use true/false",
            value
        ))),
    }
}

fn parse_u64(value: &str) -> ProcurementResult<u64> {
    value
        .parse()
        .map_err(|_| ProcurementError::User(format!("Invalid number: {}", value)))
}

fn parse_log_format(value: &str) -> ProcurementResult<String> {
    match value {
        "text" | "json" => Ok(value.to_string()),
        _ => Err(ProcurementError::User(format!(
            "Invalid log format: {}. Use text or json",
            value
        ))),
    }
}
