//! Tally CLI
//!
//! Command-line interface for tally - an income/expense ledger with
//! pluggable persistence.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use tally_core::{EntryKind, Ledger};

mod commands;
mod output;

use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Tally - income/expense ledger with pluggable persistence")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a new entry
    Add {
        /// What the money was for
        description: String,
        /// Amount, in whatever currency you keep the ledger in
        amount: f64,
        /// income or expense
        #[arg(short, long, default_value = "expense")]
        kind: EntryKind,
        /// Category label
        #[arg(short, long, default_value = tally_core::DEFAULT_CATEGORY)]
        category: String,
    },
    /// List entries
    #[command(alias = "ls")]
    List,
    /// Delete an entry
    #[command(alias = "rm")]
    Delete {
        /// Entry id
        id: String,
    },
    /// Show income, expense, and balance totals
    Balance,
    /// Show backend and storage status
    Status,
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value (empty value or 'none' clears it)
    Set {
        /// Configuration key (backend, data_dir, sheet_url, use_proxy,
        /// database_url, database_key)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));

    // Commands that only touch configuration
    if let Commands::Config { command } = &cli.command {
        return match command.clone() {
            Some(ConfigCommands::Show) | None => commands::config::show(&output),
            Some(ConfigCommands::Set { key, value }) => commands::config::set(key, value, &output),
        };
    }

    if let Commands::Status = &cli.command {
        return commands::status::show(&output);
    }

    let mut ledger = Ledger::new();

    match cli.command {
        Commands::Add {
            description,
            amount,
            kind,
            category,
        } => commands::entry::add(&mut ledger, description, amount, kind, category, &output).await,
        Commands::List => commands::entry::list(&mut ledger, &output).await,
        Commands::Delete { id } => commands::entry::delete(&mut ledger, id, &output).await,
        Commands::Balance => commands::entry::balance(&mut ledger, &output).await,
        Commands::Status | Commands::Config { .. } => unreachable!(), // Handled above
    }
}
