//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use tally_core::{Entry, EntryKind, Totals};

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print the entry collection
    pub fn print_entries(&self, entries: &[Entry]) {
        match self.format {
            OutputFormat::Human => {
                if entries.is_empty() {
                    println!("No entries.");
                    return;
                }
                for entry in entries {
                    println!(
                        "{} | {} | {}{:>12.2} | {} | {}",
                        id_prefix(&entry.id),
                        entry.date,
                        sign(entry.kind),
                        entry.amount,
                        truncate(&entry.description, 30),
                        entry.category
                    );
                }
                println!("\n{} entry(ies)", entries.len());
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(entries).unwrap());
            }
            OutputFormat::Quiet => {
                for entry in entries {
                    println!("{}", entry.id);
                }
            }
        }
    }

    /// Print collection totals
    pub fn print_totals(&self, totals: &Totals, count: usize) {
        match self.format {
            OutputFormat::Human => {
                println!("Income:  {:>12.2}", totals.income);
                println!("Expense: {:>12.2}", totals.expense);
                println!("Balance: {:>12.2}", totals.balance());
                println!("\n{} entry(ies)", count);
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({
                        "income": totals.income,
                        "expense": totals.expense,
                        "balance": totals.balance(),
                        "count": count
                    })
                );
            }
            OutputFormat::Quiet => {
                println!("{}", totals.balance());
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

fn sign(kind: EntryKind) -> char {
    match kind {
        EntryKind::Income => '+',
        EntryKind::Expense => '-',
    }
}

/// First eight characters of an id, safe for non-ASCII ids
fn id_prefix(id: &str) -> String {
    id.chars().take(8).collect()
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_flags() {
        assert_eq!(OutputFormat::from_flags(false, false), OutputFormat::Human);
        assert_eq!(OutputFormat::from_flags(true, false), OutputFormat::Json);
        assert_eq!(OutputFormat::from_flags(false, true), OutputFormat::Quiet);
        // Quiet takes precedence
        assert_eq!(OutputFormat::from_flags(true, true), OutputFormat::Quiet);
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("this is a long string", 10), "this is...");
        // Multibyte text truncates on character boundaries
        assert_eq!(truncate("午餐便當加飲料特大杯", 8), "午餐便當加...");
    }

    #[test]
    fn test_id_prefix() {
        assert_eq!(id_prefix("0c32a5bf-a9f2-4e07"), "0c32a5bf");
        assert_eq!(id_prefix("ab"), "ab");
    }

    #[test]
    fn test_sign() {
        assert_eq!(sign(EntryKind::Income), '+');
        assert_eq!(sign(EntryKind::Expense), '-');
    }
}
