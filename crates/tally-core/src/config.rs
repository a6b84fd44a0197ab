//! Application configuration
//!
//! Configuration is loaded from:
//! 1. Default values
//! 2. Config file (~/.config/tally/config.toml)
//! 3. Environment variables (TALLY_* prefix)
//!
//! Environment variables take precedence over config file values. The
//! sync layer re-reads configuration at the start of every operation,
//! so edits take effect on the next action without a restart.

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable prefix
const ENV_PREFIX: &str = "TALLY";

/// Which storage strategy is selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Entries live only on this device
    #[default]
    Local,
    /// Spreadsheet reached through an HTTP bridge
    Sheet,
    /// Managed database table
    Database,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BackendKind::Local => "local",
            BackendKind::Sheet => "sheet",
            BackendKind::Database => "database",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(BackendKind::Local),
            "sheet" => Ok(BackendKind::Sheet),
            "database" => Ok(BackendKind::Database),
            other => Err(format!(
                "unknown backend '{}', expected 'local', 'sheet' or 'database'",
                other
            )),
        }
    }
}

/// The resolved storage strategy for one operation
///
/// Derived from [`Config`] immediately before each operation, never
/// cached across operations. Endpoint and credential stay optional
/// inside the variant so each backend client owns its own
/// unconfigured-state contract.
#[derive(Debug, Clone, PartialEq)]
pub enum Backend {
    Local,
    Sheet {
        url: Option<String>,
        use_proxy: bool,
    },
    Database {
        url: Option<String>,
        key: Option<String>,
    },
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the mirrored entry collection
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Selected storage backend
    #[serde(default)]
    pub backend: BackendKind,

    /// Spreadsheet bridge endpoint URL
    #[serde(default)]
    pub sheet_url: Option<String>,

    /// Route bridge requests through a CORS relay when needed
    #[serde(default = "default_use_proxy")]
    pub use_proxy: bool,

    /// Managed database endpoint URL
    #[serde(default)]
    pub database_url: Option<String>,

    /// Managed database access key
    #[serde(default)]
    pub database_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            backend: BackendKind::Local,
            sheet_url: None,
            use_proxy: true,
            database_url: None,
            database_key: None,
        }
    }
}

impl Config {
    /// Load configuration from default location and environment
    ///
    /// Order of precedence (highest to lowest):
    /// 1. Environment variables (TALLY_DATA_DIR, TALLY_BACKEND, ...)
    /// 2. Config file (~/.config/tally/config.toml or TALLY_CONFIG)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        Self::load_from_path(&Self::config_file_path())
    }

    /// Load configuration from a specific path
    ///
    /// Environment variables are still applied as overrides.
    /// If the file doesn't exist, defaults are used.
    pub fn load_from_path(path: &PathBuf) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {:?}", path))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", path))?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        config.ensure_data_dir()?;
        Ok(config)
    }

    /// Load configuration from a TOML string (useful for testing)
    pub fn load_from_str(toml_content: &str) -> Result<Self> {
        let mut config: Config =
            toml::from_str(toml_content).context("Failed to parse config TOML")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// An empty value clears the field it overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(format!("{}_DATA_DIR", ENV_PREFIX)) {
            self.data_dir = PathBuf::from(val);
        }

        if let Ok(val) = std::env::var(format!("{}_BACKEND", ENV_PREFIX)) {
            if let Ok(kind) = val.parse() {
                self.backend = kind;
            }
        }

        if let Ok(val) = std::env::var(format!("{}_SHEET_URL", ENV_PREFIX)) {
            self.sheet_url = if val.is_empty() { None } else { Some(val) };
        }

        if let Ok(val) = std::env::var(format!("{}_USE_PROXY", ENV_PREFIX)) {
            // Anything but an explicit "false"/"0" keeps the proxy on
            self.use_proxy = !(val.eq_ignore_ascii_case("false") || val == "0");
        }

        if let Ok(val) = std::env::var(format!("{}_DATABASE_URL", ENV_PREFIX)) {
            self.database_url = if val.is_empty() { None } else { Some(val) };
        }

        if let Ok(val) = std::env::var(format!("{}_DATABASE_KEY", ENV_PREFIX)) {
            self.database_key = if val.is_empty() { None } else { Some(val) };
        }
    }

    /// Ensure data directory exists
    fn ensure_data_dir(&self) -> Result<()> {
        if !self.data_dir.exists() {
            std::fs::create_dir_all(&self.data_dir)
                .with_context(|| format!("Failed to create data directory: {:?}", self.data_dir))?;
        }
        Ok(())
    }

    /// Save configuration to the default file
    ///
    /// Cleared (`None`) fields are omitted from the written TOML.
    pub fn save(&self) -> Result<()> {
        self.save_to_path(&Self::config_file_path())
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, path: &PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {:?}", path))?;
        Ok(())
    }

    /// Get the config file path
    ///
    /// Can be overridden with the TALLY_CONFIG environment variable
    pub fn config_file_path() -> PathBuf {
        if let Ok(path) = std::env::var(format!("{}_CONFIG", ENV_PREFIX)) {
            return PathBuf::from(path);
        }

        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("tally")
            .join("config.toml")
    }

    /// Get the path to the mirrored entry collection
    pub fn entries_path(&self) -> PathBuf {
        self.data_dir.join("entries.json")
    }

    /// Resolve the storage strategy for the next operation
    ///
    /// Blank endpoints and keys count as absent.
    pub fn active_backend(&self) -> Backend {
        match self.backend {
            BackendKind::Local => Backend::Local,
            BackendKind::Sheet => Backend::Sheet {
                url: normalized(self.sheet_url.as_deref()),
                use_proxy: self.use_proxy,
            },
            BackendKind::Database => Backend::Database {
                url: normalized(self.database_url.as_deref()),
                key: normalized(self.database_key.as_deref()),
            },
        }
    }
}

fn normalized(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Get the default data directory
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("tally")
}

fn default_use_proxy() -> bool {
    true
}
