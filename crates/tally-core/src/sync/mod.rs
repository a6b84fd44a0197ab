//! Data synchronization
//!
//! The coordinator decides where ledger entries live, reconciles local
//! and remote state, and keeps the local store as a mirror for fallback
//! reads. The active backend is derived fresh from configuration on
//! every operation, so configuration edits take effect on the next
//! action.

mod bridge;
mod database;

pub use bridge::{candidate_urls, parse_payload, BridgeClient};
pub use database::DatabaseClient;

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::config::{Backend, Config};
use crate::error::SyncError;
use crate::models::{Entry, EntryDraft};
use crate::storage::LocalStore;

/// The sync coordinator
///
/// Owns the current entry collection, the last user-visible error, and
/// a loading flag for the UI. Operations are sequential: the `&mut
/// self` receiver serializes them, and the mirror is always replaced
/// wholesale, never merged.
pub struct Ledger {
    http: reqwest::Client,
    bridge: BridgeClient,
    config_path: Option<PathBuf>,
    entries: Vec<Entry>,
    last_error: Option<String>,
    loading: bool,
}

impl Ledger {
    /// Coordinator reading configuration from the default location
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Coordinator reading configuration from a specific file
    pub fn with_config_path(path: PathBuf) -> Self {
        Self::build(Some(path))
    }

    fn build(config_path: Option<PathBuf>) -> Self {
        let http = reqwest::Client::new();
        Self {
            bridge: BridgeClient::new(http.clone()),
            http,
            config_path,
            entries: Vec::new(),
            last_error: None,
            loading: false,
        }
    }

    /// The current entry collection
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Whether an operation is in flight
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The last operation's user-visible error, if it failed
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Read configuration fresh; every public operation starts here
    fn load_config(&self) -> Result<Config, SyncError> {
        let result = match &self.config_path {
            Some(path) => Config::load_from_path(path),
            None => Config::load(),
        };
        result.map_err(|e| SyncError::Config(format!("failed to load configuration: {:#}", e)))
    }

    /// Load the collection from the active backend
    ///
    /// Remote results are mirrored into the local store. On a remote
    /// failure the error is surfaced *and* the last mirrored snapshot
    /// is presented, so a transient failure never empties the UI.
    pub async fn load(&mut self) -> Result<&[Entry], SyncError> {
        let config = self.load_config()?;
        let store = LocalStore::new(&config);

        let backend = config.active_backend();
        if matches!(backend, Backend::Local) {
            self.entries = store.load();
            self.last_error = None;
            return Ok(&self.entries);
        }

        self.loading = true;
        let outcome = self.remote_fetch(&backend).await;
        self.loading = false;

        match outcome {
            Ok(entries) => {
                store.save(&entries)?;
                self.entries = entries;
                self.last_error = None;
                Ok(&self.entries)
            }
            Err(e) => {
                warn!(error = %e, "remote load failed, presenting mirrored snapshot");
                self.entries = store.load();
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Add an entry through the active backend
    ///
    /// Drafts with a blank description or non-positive amount are
    /// ignored: the collection is left unchanged and no request is
    /// issued. On a remote failure nothing is mutated, locally or
    /// remotely visible.
    pub async fn add(&mut self, draft: EntryDraft) -> Result<&[Entry], SyncError> {
        if !draft.is_valid() {
            debug!("ignoring invalid entry draft");
            return Ok(&self.entries);
        }

        let config = self.load_config()?;
        let store = LocalStore::new(&config);
        let entry = Entry::from_draft(&draft);

        let backend = config.active_backend();
        self.loading = true;
        let outcome = match &backend {
            Backend::Local => {
                let mut entries = store.load();
                entries.push(entry);
                Ok(entries)
            }
            Backend::Sheet { url, use_proxy } => match url {
                Some(url) => self.bridge.add(url, *use_proxy, &entry).await,
                None => Err(unconfigured_sheet()),
            },
            Backend::Database { url, key } => {
                self.database(url.clone(), key.clone()).add(&entry).await
            }
        };
        self.loading = false;

        self.mirror(store, outcome)
    }

    /// Delete an entry by id through the active backend
    ///
    /// Deleting an id that does not exist leaves the collection
    /// unchanged.
    pub async fn delete(&mut self, id: &str) -> Result<&[Entry], SyncError> {
        let config = self.load_config()?;
        let store = LocalStore::new(&config);

        let backend = config.active_backend();
        self.loading = true;
        let outcome = match &backend {
            Backend::Local => {
                let mut entries = store.load();
                entries.retain(|entry| entry.id != id);
                Ok(entries)
            }
            Backend::Sheet { url, use_proxy } => match url {
                Some(url) => self.bridge.delete(url, *use_proxy, id).await,
                None => Err(unconfigured_sheet()),
            },
            Backend::Database { url, key } => {
                self.database(url.clone(), key.clone()).delete(id).await
            }
        };
        self.loading = false;

        self.mirror(store, outcome)
    }

    async fn remote_fetch(&self, backend: &Backend) -> Result<Vec<Entry>, SyncError> {
        match backend {
            Backend::Local => Ok(Vec::new()),
            Backend::Sheet { url, use_proxy } => match url {
                Some(url) => self.bridge.fetch_all(url, *use_proxy).await,
                None => Err(unconfigured_sheet()),
            },
            Backend::Database { url, key } => {
                self.database(url.clone(), key.clone()).fetch_all().await
            }
        }
    }

    fn database(&self, url: Option<String>, key: Option<String>) -> DatabaseClient {
        DatabaseClient::new(self.http.clone(), url, key)
    }

    /// Persist an authoritative collection and present it, or surface
    /// the failure leaving prior state untouched
    fn mirror(
        &mut self,
        store: LocalStore,
        outcome: Result<Vec<Entry>, SyncError>,
    ) -> Result<&[Entry], SyncError> {
        match outcome {
            Ok(entries) => {
                store.save(&entries)?;
                self.entries = entries;
                self.last_error = None;
                Ok(&self.entries)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

fn unconfigured_sheet() -> SyncError {
    SyncError::Config("spreadsheet endpoint not configured".to_string())
}
