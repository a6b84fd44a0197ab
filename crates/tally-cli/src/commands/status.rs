//! Status command handler

use anyhow::{Context, Result};

use tally_core::{Backend, Config, LocalStore, Totals};

use crate::output::{Output, OutputFormat};

/// Show backend and storage status
pub fn show(output: &Output) -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    let store = LocalStore::new(&config);
    let entries = store.load();
    let totals = Totals::of(&entries);

    let backend_label = match config.active_backend() {
        Backend::Local => "local".to_string(),
        Backend::Sheet { url, use_proxy } => format!(
            "spreadsheet bridge ({}, proxy {})",
            url.as_deref().unwrap_or("no endpoint"),
            if use_proxy { "on" } else { "off" }
        ),
        Backend::Database { url, key } => format!(
            "managed database ({}, key {})",
            url.as_deref().unwrap_or("no endpoint"),
            if key.is_some() { "set" } else { "not set" }
        ),
    };

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "backend": config.backend.as_str(),
                    "mirror": {
                        "path": store.path(),
                        "exists": store.exists(),
                        "entries": entries.len()
                    },
                    "balance": totals.balance()
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", config.backend);
        }
        OutputFormat::Human => {
            println!("Tally Status");
            println!("============");
            println!();
            println!("Backend: {}", backend_label);
            println!();
            println!("Local mirror:");
            println!("  Location: {}", store.path().display());
            println!("  Entries:  {}", entries.len());
            println!("  Balance:  {:.2}", totals.balance());
        }
    }

    Ok(())
}
