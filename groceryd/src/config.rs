//! Daemon configuration.
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::error::{DaemonError, DaemonResult};
use std::env;
use std::path::PathBuf;

/// Default data file, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "data/grocery.json";

// =============================================================================
// Configuration
// =============================================================================

/// Daemon configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Storage configuration
    pub storage: StorageConfig,

    /// Environment (test, development, production)
    pub environment: Environment,
}

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
}

/// Storage backend selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageConfig {
    /// In-memory store, optionally seeded from a document that is never written
    Memory { seed: Option<PathBuf> },
    /// JSON document read at startup and rewritten on every change
    File { path: PathBuf },
}

/// Environment type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Test environment
    Test,
    /// Development environment
    Development,
    /// Production environment
    Production,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> DaemonResult<Self> {
        // Load .env file if present (ignore errors)
        let _ = dotenvy::dotenv();

        let environment = Self::load_environment()?;
        let api = Self::load_api_config()?;
        let storage = Self::load_storage_config()?;

        Ok(Self {
            api,
            storage,
            environment,
        })
    }

    /// Create test configuration.
    pub fn test() -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
            },
            storage: StorageConfig::Memory { seed: None },
            environment: Environment::Test,
        }
    }

    fn load_environment() -> DaemonResult<Environment> {
        let env_str = env::var("GROCERY_ENV").unwrap_or_else(|_| "development".to_string());
        Environment::parse(&env_str)
    }

    fn load_api_config() -> DaemonResult<ApiConfig> {
        let host = env::var("GROCERY_API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port_str = env::var("PORT").unwrap_or_else(|_| "3000".to_string());

        let port = port_str
            .parse::<u16>()
            .map_err(|_| DaemonError::Config(format!("Invalid PORT: {}", port_str)))?;

        Ok(ApiConfig { host, port })
    }

    fn load_storage_config() -> DaemonResult<StorageConfig> {
        let kind = env::var("GROCERY_STORAGE").unwrap_or_else(|_| "memory".to_string());
        let path = env::var("GROCERY_DATA_PATH").ok().map(PathBuf::from);
        StorageConfig::parse(&kind, path)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: ApiConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            storage: StorageConfig::Memory {
                seed: Some(PathBuf::from(DEFAULT_DATA_PATH)),
            },
            environment: Environment::Development,
        }
    }
}

impl StorageConfig {
    /// Build from a backend name and an optional data path.
    ///
    /// Without a path both backends fall back to [`DEFAULT_DATA_PATH`].
    pub fn parse(kind: &str, path: Option<PathBuf>) -> DaemonResult<Self> {
        let path = path.unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_PATH));

        match kind.to_lowercase().as_str() {
            "memory" | "mem" => Ok(StorageConfig::Memory { seed: Some(path) }),
            "file" | "json" => Ok(StorageConfig::File { path }),
            other => Err(DaemonError::Config(format!(
                "Invalid GROCERY_STORAGE: {}. Expected: memory, file",
                other
            ))),
        }
    }
}

impl Environment {
    /// Parse an environment name.
    pub fn parse(value: &str) -> DaemonResult<Self> {
        match value.to_lowercase().as_str() {
            "test" => Ok(Environment::Test),
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            other => Err(DaemonError::Config(format!(
                "Invalid GROCERY_ENV: {}. Expected: test, development, production",
                other
            ))),
        }
    }
}

impl Environment {
    /// Log filter used when `RUST_LOG` is not set.
    pub fn log_directive(&self) -> &'static str {
        match self {
            Environment::Test => "groceryd=warn,grocery_store=warn",
            Environment::Development => "groceryd=debug,grocery_store=debug,tower_http=debug",
            Environment::Production => "groceryd=info,grocery_store=info",
        }
    }

    /// Production logs are emitted as JSON lines.
    pub fn json_logs(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Test => write!(f, "test"),
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl std::fmt::Display for StorageConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageConfig::Memory { seed: Some(path) } => {
                write!(f, "memory (seed {})", path.display())
            },
            StorageConfig::Memory { seed: None } => write!(f, "memory"),
            StorageConfig::File { path } => write!(f, "file ({})", path.display()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
