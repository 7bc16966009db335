//! # Catalog Configuration
//!
//! Settings for where the products database lives and which provider
//! authority and schema revision the store serves.
//!
//! ## Load Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. CatalogConfig::default()                                           │
//! │  2. catalog.toml (explicit path, or the platform config dir)           │
//! │  3. CATALOG_DB_PATH / CATALOG_AUTHORITY / CATALOG_SCHEMA /             │
//! │     CATALOG_MAX_CONNECTIONS                                            │
//! │  4. validate()                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example File
//! ```toml
//! [database]
//! path = "/var/lib/catalog/products.db"
//! max_connections = 5
//!
//! [provider]
//! authority = "com.davidread.clothescatalog"
//! schema = "picture"
//! ```

use catalog_core::{SchemaRevision, CONTENT_AUTHORITY};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::gateway::DbConfig;

/// File name of the products database in the platform data dir.
pub const DATABASE_FILE_NAME: &str = "products.db";

/// File name of the config file in the platform config dir.
pub const CONFIG_FILE_NAME: &str = "catalog.toml";

// =============================================================================
// Errors
// =============================================================================

/// Configuration load/save errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config file is not valid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config could not be serialized: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("No config path available")]
    NoPath,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

// =============================================================================
// Sections
// =============================================================================

/// `[database]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite file. `:memory:` selects a private in-memory database.
    pub path: PathBuf,

    pub max_connections: u32,

    pub min_connections: u32,

    pub connect_timeout_secs: u64,

    pub idle_timeout_secs: u64,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        DatabaseSettings {
            path: default_database_path(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 30,
            idle_timeout_secs: 600,
        }
    }
}

/// `[provider]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Authority that item and collection addresses must carry.
    pub authority: String,

    /// Table layout of the database.
    pub schema: SchemaRevision,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        ProviderSettings {
            authority: CONTENT_AUTHORITY.to_string(),
            schema: SchemaRevision::default(),
        }
    }
}

// =============================================================================
// Catalog Config
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub database: DatabaseSettings,

    #[serde(default)]
    pub provider: ProviderSettings,
}

impl CatalogConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// A missing file is not an error; an unreadable or malformed one is.
    pub fn load(config_path: Option<PathBuf>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading catalog config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load catalog config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file as pretty TOML.
    pub fn save(&self, config_path: Option<PathBuf>) -> ConfigResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or(ConfigError::NoPath)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Catalog config saved");
        Ok(())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let authority = &self.provider.authority;
        if authority.is_empty() {
            return Err(ConfigError::Invalid("authority must not be empty".into()));
        }
        if authority.contains(['/', ':']) || authority.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid(format!(
                "authority must be a bare host name, got: {}",
                authority
            )));
        }

        if self.database.max_connections == 0 {
            return Err(ConfigError::Invalid(
                "max_connections must be greater than 0".into(),
            ));
        }
        if self.database.min_connections > self.database.max_connections {
            return Err(ConfigError::Invalid(format!(
                "min_connections ({}) exceeds max_connections ({})",
                self.database.min_connections, self.database.max_connections
            )));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("CATALOG_DB_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database.path = PathBuf::from(path);
        }

        if let Ok(authority) = std::env::var("CATALOG_AUTHORITY") {
            debug!(authority = %authority, "Overriding authority from environment");
            self.provider.authority = authority;
        }

        if let Ok(schema) = std::env::var("CATALOG_SCHEMA") {
            match schema.parse() {
                Ok(revision) => self.provider.schema = revision,
                Err(e) => warn!("Ignoring CATALOG_SCHEMA: {}", e),
            }
        }

        if let Ok(max) = std::env::var("CATALOG_MAX_CONNECTIONS") {
            if let Ok(n) = max.parse::<u32>() {
                self.database.max_connections = n;
            }
        }
    }

    /// `<config dir>/catalog.toml`, if the platform has a config dir.
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "davidread", "clothescatalog")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    /// Gateway settings for this config.
    pub fn db_config(&self) -> DbConfig {
        let db = &self.database;
        let base = if db.path.as_os_str() == ":memory:" {
            DbConfig::in_memory()
        } else {
            DbConfig::new(&db.path)
                .max_connections(db.max_connections)
                .min_connections(db.min_connections)
                .idle_timeout(Duration::from_secs(db.idle_timeout_secs))
        };

        base.connect_timeout(Duration::from_secs(db.connect_timeout_secs))
            .schema_revision(self.provider.schema)
    }
}

/// `<data dir>/products.db`, or `products.db` in the working directory.
fn default_database_path() -> PathBuf {
    directories::ProjectDirs::from("com", "davidread", "clothescatalog")
        .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE_NAME))
}
