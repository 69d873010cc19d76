//! Configuration loading and resolution
//!
//! Each setting resolves in priority order:
//! 1. Command-line argument or its environment variable (collected by the binary)
//! 2. TOML config file
//! 3. OS-dependent compiled default (fallback)
//!
//! A missing TOML file is not an error; the service starts on defaults.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default HTTP port for the API service
pub const DEFAULT_PORT: u16 = 2500;

/// Default number of top-rated photos attached to plant lookups
pub const DEFAULT_PLANTS_MAX_PHOTOS: u32 = 3;

/// Compiled defaults used when neither CLI nor TOML set a value
#[derive(Debug, Clone)]
pub struct CompiledDefaults {
    pub database_path: PathBuf,
    pub bind_addr: String,
    pub port: u16,
    pub log_level: String,
    pub plants_max_photos: u32,
}

impl CompiledDefaults {
    pub fn for_current_platform() -> Self {
        Self {
            database_path: default_data_folder().join("greenthumb.db"),
            bind_addr: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            log_level: "info".to_string(),
            plants_max_photos: DEFAULT_PLANTS_MAX_PHOTOS,
        }
    }
}

/// OS-dependent data folder
fn default_data_folder() -> PathBuf {
    if cfg!(target_os = "linux") {
        // ~/.local/share/greenthumb (or /var/lib/greenthumb for system-wide)
        dirs::data_local_dir()
            .map(|d| d.join("greenthumb"))
            .unwrap_or_else(|| PathBuf::from("/var/lib/greenthumb"))
    } else if cfg!(target_os = "macos") {
        dirs::data_dir()
            .map(|d| d.join("greenthumb"))
            .unwrap_or_else(|| PathBuf::from("/Library/Application Support/greenthumb"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
            .map(|d| d.join("greenthumb"))
            .unwrap_or_else(|| PathBuf::from("C:\\ProgramData\\greenthumb"))
    } else {
        PathBuf::from("./greenthumb_data")
    }
}

/// Default TOML config path: `<config_dir>/greenthumb/gt-api.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("greenthumb").join("gt-api.toml"))
}

/// Logging section of the TOML file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// TOML config file contents; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TomlConfig {
    pub database_path: Option<PathBuf>,
    pub bind_addr: Option<String>,
    pub port: Option<u16>,
    /// Base URL of the plant classifier service
    pub classifier_url: Option<String>,
    /// Account ids created (or promoted) as admins at startup
    #[serde(default)]
    pub initial_admins: Vec<i64>,
    pub plants_max_photos: Option<u32>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Load TOML config from `path`
///
/// Missing file: warning plus empty config. Unreadable or malformed file: error.
pub fn load_toml_config(path: &Path) -> Result<TomlConfig> {
    if !path.exists() {
        warn!("Config file not found: {} (using defaults)", path.display());
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed: {}", e)))?;
    let config = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed: {}", e)))?;

    info!("Loaded config file: {}", path.display());
    Ok(config)
}

/// Values given on the command line (or their environment variables)
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_path: Option<PathBuf>,
    pub bind_addr: Option<String>,
    pub port: Option<u16>,
    pub classifier_url: Option<String>,
    pub initial_admins: Vec<i64>,
    pub log_level: Option<String>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub database_path: PathBuf,
    pub bind_addr: String,
    pub port: u16,
    pub classifier_url: Option<String>,
    pub initial_admins: Vec<i64>,
    pub plants_max_photos: u32,
    pub log_level: String,
}

impl ServiceConfig {
    /// Merge CLI overrides, TOML values and compiled defaults
    pub fn resolve(
        overrides: ConfigOverrides,
        toml: TomlConfig,
        defaults: CompiledDefaults,
    ) -> Result<Self> {
        let classifier_url = overrides
            .classifier_url
            .or(toml.classifier_url)
            .map(|url| url.trim().trim_end_matches('/').to_string());
        if let Some(url) = &classifier_url {
            if url.is_empty() {
                return Err(Error::Config("classifier_url may not be empty".to_string()));
            }
        }

        let initial_admins = if overrides.initial_admins.is_empty() {
            toml.initial_admins
        } else {
            overrides.initial_admins
        };
        if let Some(id) = initial_admins.iter().find(|id| **id < 0) {
            return Err(Error::Config(format!(
                "initial_admins may not contain negative ids ({})",
                id
            )));
        }

        Ok(Self {
            database_path: overrides
                .database_path
                .or(toml.database_path)
                .unwrap_or(defaults.database_path),
            bind_addr: overrides
                .bind_addr
                .or(toml.bind_addr)
                .unwrap_or(defaults.bind_addr),
            port: overrides.port.or(toml.port).unwrap_or(defaults.port),
            classifier_url,
            initial_admins,
            plants_max_photos: toml
                .plants_max_photos
                .unwrap_or(defaults.plants_max_photos),
            log_level: overrides
                .log_level
                .or_else(|| Some(toml.logging.level).filter(|level| !level.trim().is_empty()))
                .unwrap_or(defaults.log_level),
        })
    }

    /// `host:port` listen address
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}
