//! Configuration loaded from environment variables (and `.env` via dotenv)
//!
//! Environment variables:
//! - `DB_HOST` (default: localhost)
//! - `DB_PORT` (default: 5432)
//! - `DB_USER` (default: postgres)
//! - `DB_PASSWORD` (default: postgres)
//! - `DB_NAME` (default: municipios.db) - SQLite database path; `:memory:` only
//!   suits the importer, since every report opens a fresh connection
//! - `DB_TABLE` (default: municipios)
//! - `SOURCE_PATH` (default: dados/ibge.csv)
//! - `REPORT_YEAR` (default: 2021)
//! - `BATCH_SIZE` (optional) - split batched loads into commits of this many
//!   records; unset means one batch for the whole record set

use crate::loader::LoadStrategy;
use crate::record::Year;
use std::env;
use std::path::PathBuf;

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(msg) => write!(f, "Invalid configuration value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Storage endpoint settings.
///
/// The endpoint is SQLite, so only `database` (the file path) and
/// `table_name` select anything. Host, port and credentials are kept so a
/// deployment's connection settings can be passed through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub database: String,
    pub table_name: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            database: "municipios.db".to_string(),
            table_name: "municipios".to_string(),
        }
    }
}

impl StoreConfig {
    pub fn with_database(database: impl Into<String>) -> Self {
        Self {
            database: database.into(),
            ..Self::default()
        }
    }

    /// `:memory:` opens a private database that disappears with its connection
    pub fn is_in_memory(&self) -> bool {
        self.database == ":memory:"
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.trim().is_empty() {
            return Err(ConfigError::InvalidValue("database cannot be empty".to_string()));
        }
        validate_identifier(&self.table_name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub store: StoreConfig,
    pub source_path: PathBuf,
    pub year: Year,
    /// `None` sends the whole record set as a single batch
    pub batch_size: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            source_path: PathBuf::from("dados/ibge.csv"),
            year: Year::Y2021,
            batch_size: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from any key lookup, falling back to defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let port = match lookup("DB_PORT") {
            Some(s) => s.trim().parse::<u16>().map_err(|_| {
                ConfigError::InvalidValue(format!("DB_PORT '{}' is not a port number", s))
            })?,
            None => defaults.store.port,
        };

        let year = match lookup("REPORT_YEAR") {
            Some(s) => s.parse::<Year>().map_err(ConfigError::InvalidValue)?,
            None => defaults.year,
        };

        let batch_size = match lookup("BATCH_SIZE") {
            Some(s) => Some(s.trim().parse::<usize>().map_err(|_| {
                ConfigError::InvalidValue(format!("BATCH_SIZE '{}' is not a number", s))
            })?),
            None => defaults.batch_size,
        };

        let config = Self {
            store: StoreConfig {
                host: lookup("DB_HOST").unwrap_or(defaults.store.host),
                port,
                user: lookup("DB_USER").unwrap_or(defaults.store.user),
                password: lookup("DB_PASSWORD").unwrap_or(defaults.store.password),
                database: lookup("DB_NAME").unwrap_or(defaults.store.database),
                table_name: lookup("DB_TABLE").unwrap_or(defaults.store.table_name),
            },
            source_path: lookup("SOURCE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.source_path),
            year,
            batch_size,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == Some(0) {
            return Err(ConfigError::InvalidValue(
                "BATCH_SIZE must be greater than 0".to_string(),
            ));
        }
        self.store.validate()
    }

    /// Log the effective configuration (password masked)
    pub fn log_summary(&self) {
        log::info!("📊 Configuration:");
        log::info!("   Database: {}", self.store.database);
        log::info!("   Table: {}", self.store.table_name);
        log::info!(
            "   Endpoint: {}@{}:{} (password: {})",
            self.store.user,
            self.store.host,
            self.store.port,
            if self.store.password.is_empty() { "none" } else { "****" }
        );
        log::info!("   Source: {}", self.source_path.display());
        log::info!("   Report year: {}", self.year);
        match self.batch_size {
            Some(size) => log::info!("   Batch size: {}", size),
            None => log::info!("   Batch size: whole record set"),
        }
    }
}

/// Table names are interpolated into SQL, so only `[A-Za-z_][A-Za-z0-9_]*` is accepted
pub fn validate_identifier(name: &str) -> Result<(), ConfigError> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ConfigError::InvalidValue(format!(
            "table name '{}' must be a plain SQL identifier",
            name
        )))
    }
}

/// Strategies selected with `--strategy row,transaction,...` (default: all of them)
pub fn parse_strategies_from_args(args: &[String]) -> Result<Vec<LoadStrategy>, ConfigError> {
    match flag_value(args, "--strategy") {
        Some(value) => value
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<LoadStrategy>().map_err(ConfigError::InvalidValue))
            .collect(),
        None => Ok(LoadStrategy::all().to_vec()),
    }
}

/// `--year 2020` overrides `REPORT_YEAR`
pub fn parse_year_from_args(args: &[String], fallback: Year) -> Result<Year, ConfigError> {
    match flag_value(args, "--year") {
        Some(value) => value.parse::<Year>().map_err(ConfigError::InvalidValue),
        None => Ok(fallback),
    }
}

pub fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|idx| args.get(idx + 1))
        .map(|s| s.as_str())
}
