//! Data directory layout and `config.json`.
//!
//! The data directory is `$KAKEIBO_HOME` when set, otherwise the platform data
//! dir. It holds the SQLite database, the config file, the persisted session
//! token and the TUI log file.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const DB_FILE: &str = "kakeibo.db";
const SESSION_FILE: &str = "session";
const LOG_FILE: &str = "kakeibo.log";
const HOME_VAR: &str = "KAKEIBO_HOME";

/// Resolved paths plus the parsed config file.
#[derive(Debug, Clone)]
pub(crate) struct Config {
    root: PathBuf,
    file: ConfigFile,
}

impl Config {
    /// Use `$KAKEIBO_HOME` or fall back to the platform data directory.
    pub(crate) fn default_root() -> Result<PathBuf> {
        if let Some(home) = std::env::var_os(HOME_VAR).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(home));
        }
        let proj_dirs = directories::ProjectDirs::from("com", "kakeibo", "Kakeibo")
            .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    /// Create `root` if needed and load `config.json`, writing the defaults
    /// on first run.
    pub(crate) fn load_or_create(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create data directory: {}", root.display()))?;

        let config_path = root.join(CONFIG_JSON);
        let file = if config_path.is_file() {
            ConfigFile::load(&config_path)?
        } else {
            let file = ConfigFile::default();
            file.save(&config_path)?;
            file
        };

        Ok(Self { root, file })
    }

    pub(crate) fn root(&self) -> &Path {
        &self.root
    }

    pub(crate) fn db_path(&self) -> PathBuf {
        self.root.join(DB_FILE)
    }

    pub(crate) fn session_path(&self) -> PathBuf {
        self.root.join(SESSION_FILE)
    }

    pub(crate) fn log_path(&self) -> PathBuf {
        self.root.join(LOG_FILE)
    }

    pub(crate) fn currency(&self) -> &Currency {
        &self.file.currency
    }

    pub(crate) fn log_level(&self) -> &str {
        &self.file.log_level
    }

    pub(crate) fn trend_months(&self) -> usize {
        usize::from(self.file.trend_months.max(1))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub(crate) struct Currency {
    pub(crate) symbol: String,
    /// Digits shown after the decimal point.
    pub(crate) decimals: u32,
}

impl Default for Currency {
    fn default() -> Self {
        Self {
            symbol: "¥".to_string(),
            decimals: 0,
        }
    }
}

/// On-disk shape of `config.json`:
///
/// ```json
/// {
///   "version": 1,
///   "currency": { "symbol": "¥", "decimals": 0 },
///   "log_level": "info",
///   "trend_months": 12
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
struct ConfigFile {
    version: u8,
    currency: Currency,
    log_level: String,
    trend_months: u8,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            currency: Currency::default(),
            log_level: "info".to_string(),
            trend_months: 12,
        }
    }
}

impl ConfigFile {
    fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;
        let file: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;
        anyhow::ensure!(
            file.version <= CONFIG_VERSION,
            "Config file version {} is newer than supported version {}",
            file.version,
            CONFIG_VERSION
        );
        Ok(file)
    }

    fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file at {}", path.display()))
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
