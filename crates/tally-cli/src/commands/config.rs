//! Config command handlers

use anyhow::{bail, Context, Result};

use tally_core::Config;

use crate::output::{Output, OutputFormat};

/// Show current configuration
pub fn show(output: &Output) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "backend": config.backend.as_str(),
                    "data_dir": config.data_dir,
                    "sheet_url": config.sheet_url,
                    "use_proxy": config.use_proxy,
                    "database_url": config.database_url,
                    "database_key_set": config.database_key.is_some()
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.backend);
        }
        OutputFormat::Human => {
            println!("Configuration:");
            println!("  backend:      {}", config.backend);
            println!("  data_dir:     {}", config.data_dir.display());
            println!(
                "  sheet_url:    {}",
                config.sheet_url.as_deref().unwrap_or("(not set)")
            );
            println!("  use_proxy:    {}", config.use_proxy);
            println!(
                "  database_url: {}",
                config.database_url.as_deref().unwrap_or("(not set)")
            );
            println!(
                "  database_key: {}",
                if config.database_key.is_some() {
                    "(set)"
                } else {
                    "(not set)"
                }
            );
            println!();
            println!("Config file: {}", Config::config_file_path().display());
        }
    }

    Ok(())
}

/// Set a configuration value
///
/// An empty value (or 'none') clears the key, removing it from the
/// persisted file.
pub fn set(key: String, value: String, output: &Output) -> Result<()> {
    let mut config = Config::load().context("Failed to load configuration")?;
    let cleared = value.is_empty() || value == "none";

    match key.as_str() {
        "backend" => {
            config.backend = value.parse().map_err(|e: String| anyhow::anyhow!(e))?;
        }
        "data_dir" => {
            config.data_dir = value.clone().into();
        }
        "sheet_url" => {
            config.sheet_url = if cleared { None } else { Some(value.clone()) };
        }
        "use_proxy" => {
            config.use_proxy = value
                .parse()
                .context("Invalid value for use_proxy. Use 'true' or 'false'.")?;
        }
        "database_url" => {
            config.database_url = if cleared { None } else { Some(value.clone()) };
        }
        "database_key" => {
            config.database_key = if cleared { None } else { Some(value.clone()) };
        }
        _ => {
            bail!(
                "Unknown configuration key: '{}'\n\
                 Valid keys: backend, data_dir, sheet_url, use_proxy, database_url, database_key",
                key
            );
        }
    }

    config.save().context("Failed to save configuration")?;

    if cleared {
        output.success(&format!("Cleared {}", key));
    } else {
        output.success(&format!("Set {} = {}", key, value));
    }

    Ok(())
}
