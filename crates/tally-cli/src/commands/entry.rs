//! Entry command handlers

use anyhow::{bail, Result};

use tally_core::{EntryDraft, EntryKind, Ledger, Totals};

use crate::output::Output;

/// Record a new entry through the active backend
pub async fn add(
    ledger: &mut Ledger,
    description: String,
    amount: f64,
    kind: EntryKind,
    category: String,
    output: &Output,
) -> Result<()> {
    // The coordinator ignores invalid drafts silently; reject them
    // here so the user hears about typos
    if description.trim().is_empty() {
        bail!("Description must not be empty");
    }
    if !amount.is_finite() || amount <= 0.0 {
        bail!("Amount must be a positive number");
    }

    let draft = EntryDraft::new(description.trim(), amount, kind, category);
    ledger.add(draft).await?;

    output.success(&format!(
        "Recorded {} {:.2} ({})",
        kind, amount, description.trim()
    ));
    Ok(())
}

/// List entries from the active backend
///
/// A remote failure is reported as a warning; the mirrored snapshot is
/// shown so there is still something on screen.
pub async fn list(ledger: &mut Ledger, output: &Output) -> Result<()> {
    load_with_fallback(ledger, output).await;
    output.print_entries(ledger.entries());
    Ok(())
}

/// Delete an entry by id
pub async fn delete(ledger: &mut Ledger, id: String, output: &Output) -> Result<()> {
    ledger.delete(&id).await?;
    output.success(&format!("Deleted {}", id));
    Ok(())
}

/// Show income, expense, and balance totals
pub async fn balance(ledger: &mut Ledger, output: &Output) -> Result<()> {
    load_with_fallback(ledger, output).await;
    let totals = Totals::of(ledger.entries());
    output.print_totals(&totals, ledger.entries().len());
    Ok(())
}

/// Load the collection, warning instead of failing on remote errors
async fn load_with_fallback(ledger: &mut Ledger, output: &Output) {
    if let Err(e) = ledger.load().await {
        if !output.is_quiet() {
            eprintln!("⚠ Remote load failed: {}", e);
            eprintln!("  Showing the last locally mirrored entries.");
        }
    }
}
