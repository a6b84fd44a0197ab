//! Data models for tally
//!
//! Defines ledger entries, the drafts the UI submits, and collection
//! totals. Entries travel as JSON between the local mirror and the
//! remote backends, so the wire field names are fixed here (`kind`
//! serializes as `type`).

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::str::FromStr;
use uuid::Uuid;

/// Fallback category for rows that arrive without one
pub const DEFAULT_CATEGORY: &str = "其他";

/// Whether an entry is money in or money out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Income,
    #[default]
    Expense,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        }
    }
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(EntryKind::Income),
            "expense" => Ok(EntryKind::Expense),
            other => Err(format!(
                "unknown entry kind '{}', expected 'income' or 'expense'",
                other
            )),
        }
    }
}

/// One ledger record
///
/// Entries are append-only: the sync layer never mutates one in place,
/// it only adds new entries and deletes by id. The identifier is
/// assigned at creation and never reused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Opaque unique identifier
    pub id: String,
    /// What the money was for
    pub description: String,
    /// Positive amount in currency-agnostic units
    pub amount: f64,
    /// Income or expense
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Free-form label; the storage layer does not validate it
    pub category: String,
    /// Creation date, `YYYY-MM-DD`
    pub date: String,
}

impl Entry {
    /// Build a full entry from a draft
    ///
    /// Assigns a fresh UUID and stamps today's date (UTC); both are
    /// fixed for the lifetime of the entry.
    pub fn from_draft(draft: &EntryDraft) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            description: draft.description.trim().to_string(),
            amount: draft.amount,
            kind: draft.kind,
            category: draft.category.clone(),
            date: Utc::now().format("%Y-%m-%d").to_string(),
        }
    }

    /// Decode a backend row, substituting defaults for missing or
    /// invalid fields
    ///
    /// A partially malformed row never fails the whole read. The
    /// defaults are part of the contract: empty description, zero
    /// amount, expense, `其他`, empty date.
    pub fn from_row(row: &Value) -> Self {
        Self {
            id: str_field(row, "id"),
            description: str_field(row, "description"),
            amount: amount_field(row),
            kind: match row.get("type").and_then(Value::as_str) {
                Some("income") => EntryKind::Income,
                _ => EntryKind::Expense,
            },
            category: match row.get("category").and_then(Value::as_str) {
                Some(c) if !c.is_empty() => c.to_string(),
                _ => DEFAULT_CATEGORY.to_string(),
            },
            date: str_field(row, "date"),
        }
    }
}

fn str_field(row: &Value, key: &str) -> String {
    row.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Some backends return amounts as numbers, others as strings
fn amount_field(row: &Value) -> f64 {
    match row.get("amount") {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Coerce a backend payload into an entry collection
///
/// Anything that is not a JSON array decodes as empty rather than
/// failing the read.
pub fn entries_from_value(value: &Value) -> Vec<Entry> {
    match value.as_array() {
        Some(rows) => rows.iter().map(Entry::from_row).collect(),
        None => Vec::new(),
    }
}

/// Plain entry data as submitted by the UI
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub description: String,
    pub amount: f64,
    pub kind: EntryKind,
    pub category: String,
}

impl EntryDraft {
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        kind: EntryKind,
        category: impl Into<String>,
    ) -> Self {
        Self {
            description: description.into(),
            amount,
            kind,
            category: category.into(),
        }
    }

    /// A draft is usable once it has a non-blank description and a
    /// positive, finite amount
    pub fn is_valid(&self) -> bool {
        !self.description.trim().is_empty() && self.amount.is_finite() && self.amount > 0.0
    }
}

/// Income, expense, and balance over a collection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Totals {
    pub income: f64,
    pub expense: f64,
}

impl Totals {
    pub fn of(entries: &[Entry]) -> Self {
        let mut totals = Totals {
            income: 0.0,
            expense: 0.0,
        };
        for entry in entries {
            match entry.kind {
                EntryKind::Income => totals.income += entry.amount,
                EntryKind::Expense => totals.expense += entry.amount,
            }
        }
        totals
    }

    pub fn balance(&self) -> f64 {
        self.income - self.expense
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(description: &str, amount: f64) -> EntryDraft {
        EntryDraft::new(description, amount, EntryKind::Expense, "飲食")
    }

    #[test]
    fn test_from_draft_assigns_id_and_date() {
        let entry = Entry::from_draft(&draft("  Lunch  ", 120.0));
        assert!(!entry.id.is_empty());
        assert_eq!(entry.description, "Lunch");
        assert_eq!(entry.amount, 120.0);
        assert_eq!(entry.kind, EntryKind::Expense);
        assert_eq!(entry.category, "飲食");
        // YYYY-MM-DD
        assert_eq!(entry.date.len(), 10);
        assert_eq!(entry.date.matches('-').count(), 2);
    }

    #[test]
    fn test_from_draft_ids_are_unique() {
        let a = Entry::from_draft(&draft("Lunch", 120.0));
        let b = Entry::from_draft(&draft("Lunch", 120.0));
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_draft_validity() {
        assert!(draft("Lunch", 120.0).is_valid());
        assert!(!draft("", 120.0).is_valid());
        assert!(!draft("   ", 120.0).is_valid());
        assert!(!draft("Lunch", 0.0).is_valid());
        assert!(!draft("Lunch", -5.0).is_valid());
        assert!(!draft("Lunch", f64::NAN).is_valid());
        assert!(!draft("Lunch", f64::INFINITY).is_valid());
    }

    #[test]
    fn test_kind_wire_format() {
        let entry = Entry::from_draft(&EntryDraft::new("Salary", 50000.0, EntryKind::Income, "薪水"));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["type"], "income");
        assert!(json.get("kind").is_none());
    }

    #[test]
    fn test_entry_serialization_round_trip() {
        let entry = Entry::from_draft(&draft("Lunch", 120.0));
        let json = serde_json::to_string(&entry).unwrap();
        let back: Entry = serde_json::from_str(&json).unwrap();
        assert_eq!(entry, back);
    }

    #[test]
    fn test_from_row_complete() {
        let row = json!({
            "id": "abc",
            "description": "Lunch",
            "amount": 120,
            "type": "expense",
            "category": "飲食",
            "date": "2026-08-05"
        });
        let entry = Entry::from_row(&row);
        assert_eq!(entry.id, "abc");
        assert_eq!(entry.description, "Lunch");
        assert_eq!(entry.amount, 120.0);
        assert_eq!(entry.kind, EntryKind::Expense);
        assert_eq!(entry.category, "飲食");
        assert_eq!(entry.date, "2026-08-05");
    }

    #[test]
    fn test_from_row_defaults() {
        let entry = Entry::from_row(&json!({}));
        assert_eq!(entry.id, "");
        assert_eq!(entry.description, "");
        assert_eq!(entry.amount, 0.0);
        assert_eq!(entry.kind, EntryKind::Expense);
        assert_eq!(entry.category, DEFAULT_CATEGORY);
        assert_eq!(entry.date, "");
    }

    #[test]
    fn test_from_row_leniency() {
        // Amounts as strings, unknown kinds, null categories
        let row = json!({
            "id": "x",
            "amount": "12.5",
            "type": "transfer",
            "category": null
        });
        let entry = Entry::from_row(&row);
        assert_eq!(entry.amount, 12.5);
        assert_eq!(entry.kind, EntryKind::Expense);
        assert_eq!(entry.category, DEFAULT_CATEGORY);

        let bad_amount = Entry::from_row(&json!({"amount": "lots"}));
        assert_eq!(bad_amount.amount, 0.0);
    }

    #[test]
    fn test_entries_from_value() {
        let rows = json!([{"id": "a"}, {"id": "b"}]);
        let entries = entries_from_value(&rows);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "a");

        // Non-array payloads decode as empty
        assert!(entries_from_value(&json!({"error": "nope"})).is_empty());
        assert!(entries_from_value(&json!("hello")).is_empty());
        assert!(entries_from_value(&Value::Null).is_empty());
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("income".parse::<EntryKind>().unwrap(), EntryKind::Income);
        assert_eq!("expense".parse::<EntryKind>().unwrap(), EntryKind::Expense);
        assert!("transfer".parse::<EntryKind>().is_err());
    }

    #[test]
    fn test_totals() {
        let entries = vec![
            Entry::from_draft(&EntryDraft::new("Salary", 50000.0, EntryKind::Income, "薪水")),
            Entry::from_draft(&draft("Lunch", 120.0)),
            Entry::from_draft(&draft("Coffee", 80.0)),
        ];
        let totals = Totals::of(&entries);
        assert_eq!(totals.income, 50000.0);
        assert_eq!(totals.expense, 200.0);
        assert_eq!(totals.balance(), 49800.0);

        let empty = Totals::of(&[]);
        assert_eq!(empty.balance(), 0.0);
    }
}
