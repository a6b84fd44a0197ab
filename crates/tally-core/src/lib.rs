//! Tally core library
//!
//! This crate provides the data-synchronization layer for tally, a
//! personal income/expense ledger with pluggable persistence: entries
//! can live on the local device only, in a spreadsheet reached through
//! an HTTP bridge, or in a managed database table.
//!
//! # Architecture
//!
//! The [`Ledger`] coordinator picks the active backend from
//! configuration on every operation, executes reads and writes against
//! it, and mirrors the authoritative result into the local store so
//! reads always have a fallback.
//!
//! # Quick Start
//!
//! ```text
//! let mut ledger = Ledger::new();
//!
//! // Load entries (remote when configured, local otherwise)
//! ledger.load().await?;
//!
//! // Add an entry
//! let draft = EntryDraft::new("Lunch", 120.0, EntryKind::Expense, "飲食");
//! ledger.add(draft).await?;
//! ```
//!
//! # Modules
//!
//! - `sync`: backend clients and the sync coordinator (main entry point)
//! - `models`: ledger entries, drafts, and totals
//! - `storage`: local mirror persistence
//! - `config`: backend configuration
//! - `error`: sync-layer error types

pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod sync;

pub use config::{Backend, BackendKind, Config};
pub use error::SyncError;
pub use models::{Entry, EntryDraft, EntryKind, Totals, DEFAULT_CATEGORY};
pub use storage::{LocalStore, StorageError};
pub use sync::{BridgeClient, DatabaseClient, Ledger};
