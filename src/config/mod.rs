use std::env;
use std::path::PathBuf;

use crate::error::AppError;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub wizard: WizardConfig,
    pub data_source: DataSource,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub path: PathBuf,
    pub max_connections: u32,
}

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

/// Log output format
#[derive(Debug, Clone, PartialEq)]
pub enum LogFormat {
    Pretty,
    Json,
}

/// Which person store backs the wizard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DataSource {
    /// SQLite database at [`DatabaseConfig::path`]
    #[default]
    Sqlite,
    /// In-memory store seeded with a sample family; nothing is persisted
    Memory,
}

impl std::str::FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "sqlite" => Ok(DataSource::Sqlite),
            "memory" | "mock" => Ok(DataSource::Memory),
            other => Err(format!(
                "DATA_SOURCE must be 'sqlite' or 'memory', got '{}'",
                other
            )),
        }
    }
}

/// Accepted range for entered birth years
#[derive(Debug, Clone, PartialEq)]
pub struct WizardConfig {
    pub min_birth_year: i32,
    pub max_birth_year: i32,
}

impl WizardConfig {
    /// Whether `year` falls inside the accepted range (inclusive).
    pub fn accepts_year(&self, year: i32) -> bool {
        (self.min_birth_year..=self.max_birth_year).contains(&year)
    }
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            min_birth_year: 1700,
            max_birth_year: 2100,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database = DatabaseConfig {
            path: PathBuf::from(
                env::var("DATABASE_PATH").unwrap_or_else(|_| "./data/family_tree.db".to_string()),
            ),
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(5),
        };

        let logging = LoggingConfig {
            level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .to_lowercase()
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
        };

        let defaults = WizardConfig::default();
        let wizard = WizardConfig {
            min_birth_year: parse_year_var("WIZARD_MIN_BIRTH_YEAR")?
                .unwrap_or(defaults.min_birth_year),
            max_birth_year: parse_year_var("WIZARD_MAX_BIRTH_YEAR")?
                .unwrap_or(defaults.max_birth_year),
        };

        let data_source = match env::var("DATA_SOURCE") {
            Ok(raw) => raw
                .parse::<DataSource>()
                .map_err(|message| AppError::Config { message })?,
            Err(_) => DataSource::default(),
        };

        if wizard.min_birth_year > wizard.max_birth_year {
            return Err(AppError::Config {
                message: format!(
                    "WIZARD_MIN_BIRTH_YEAR ({}) is greater than WIZARD_MAX_BIRTH_YEAR ({})",
                    wizard.min_birth_year, wizard.max_birth_year
                ),
            });
        }

        Ok(Config {
            database,
            logging,
            wizard,
            data_source,
        })
    }
}

fn parse_year_var(name: &str) -> Result<Option<i32>, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<i32>()
            .map(Some)
            .map_err(|_| AppError::Config {
                message: format!("{} must be an integer year, got '{}'", name, raw),
            }),
        Err(_) => Ok(None),
    }
}
