//! Configuration loading and management

use crate::core::query::PaginationDefaults;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Environment variable naming the YAML config file
pub const CONFIG_PATH_ENV: &str = "CLINIC_CONFIG";
/// Environment variable overriding `auth.jwt_secret`
pub const JWT_SECRET_ENV: &str = "CLINIC_JWT_SECRET";
/// Environment variable switching storage to MongoDB at the given URI
pub const MONGODB_URI_ENV: &str = "CLINIC_MONGODB_URI";

const DEV_JWT_SECRET: &str = "change-me-in-production";

/// Listen address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Document store backing the collections
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    #[default]
    Memory,
    Mongodb { uri: String, database: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 key used to verify bearer tokens
    pub jwt_secret: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: DEV_JWT_SECRET.to_string(),
        }
    }
}

impl AuthConfig {
    pub fn uses_dev_secret(&self) -> bool {
        self.jwt_secret == DEV_JWT_SECRET
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub pagination: PaginationDefaults,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path))?;
        Self::from_yaml_str(&content).with_context(|| format!("invalid config file '{}'", path))
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load from `CLINIC_CONFIG` when set, else defaults, then apply env overrides
    pub fn load() -> Result<Self> {
        let config = match std::env::var(CONFIG_PATH_ENV) {
            Ok(path) => Self::from_yaml_file(&path)?,
            Err(_) => Self::default(),
        };
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply overrides looked up by environment variable name
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(secret) = lookup(JWT_SECRET_ENV) {
            self.auth.jwt_secret = secret;
        }

        if let Some(uri) = lookup(MONGODB_URI_ENV) {
            let database = match &self.storage {
                StorageConfig::Mongodb { database, .. } => database.clone(),
                StorageConfig::Memory => "clinic".to_string(),
            };
            self.storage = StorageConfig::Mongodb { uri, database };
        }

        self
    }
}
