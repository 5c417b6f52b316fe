use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: String,
}

/// Which object-store backend holds the blobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Local,
    S3,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    #[serde(default = "default_local_path")]
    pub local_path: String,
    #[serde(default)]
    pub s3: S3StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct S3StorageConfig {
    #[serde(default = "default_s3_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_s3_access_key")]
    pub access_key: String,
    #[serde(default = "default_s3_secret_key")]
    pub secret_key: String,
    #[serde(default = "default_s3_bucket")]
    pub bucket: String,
}

// Default values
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

fn default_db_path() -> String {
    "data/pdfvault.db".to_string()
}

fn default_backend() -> StorageBackend {
    StorageBackend::Local
}

fn default_local_path() -> String {
    "data/uploads".to_string()
}

fn default_s3_endpoint() -> String {
    "http://minio:9000".to_string()
}

fn default_s3_access_key() -> String {
    "minioadmin".to_string()
}

fn default_s3_secret_key() -> String {
    "minioadmin".to_string()
}

fn default_s3_bucket() -> String {
    "pdfs".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            local_path: default_local_path(),
            s3: S3StorageConfig::default(),
        }
    }
}

impl Default for S3StorageConfig {
    fn default() -> Self {
        Self {
            endpoint: default_s3_endpoint(),
            access_key: default_s3_access_key(),
            secret_key: default_s3_secret_key(),
            bucket: default_s3_bucket(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load() -> anyhow::Result<Self> {
        let mut config = Self::load_from_file()?;
        config.apply_env_overrides();
        config.ensure_directories()?;
        Ok(config)
    }

    /// Load configuration from conf.ini or config.toml
    fn load_from_file() -> anyhow::Result<Self> {
        let config_paths = ["conf.ini", "config.toml", "data/conf.ini", "data/config.toml"];

        for path in config_paths {
            if Path::new(path).exists() {
                let content = fs::read_to_string(path)?;
                let config: Config = toml::from_str(&content)?;
                tracing::info!("Loaded configuration from {}", path);
                return Ok(config);
            }
        }

        tracing::info!("No configuration file found, using defaults");
        Ok(Config::default())
    }

    /// Apply environment variable overrides
    /// Format: PV_CONF_<SECTION>_<KEY>
    fn apply_env_overrides(&mut self) {
        // Server overrides
        if let Ok(val) = env::var("PV_CONF_SERVER_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = env::var("PV_CONF_SERVER_PORT") {
            if let Ok(port) = val.parse() {
                self.server.port = port;
            }
        }

        // Database overrides
        if let Ok(val) = env::var("PV_CONF_DATABASE_PATH") {
            self.database.path = val;
        }

        // Storage overrides
        if let Ok(val) = env::var("PV_CONF_STORAGE_BACKEND") {
            match val.to_ascii_lowercase().as_str() {
                "local" => self.storage.backend = StorageBackend::Local,
                "s3" => self.storage.backend = StorageBackend::S3,
                other => tracing::warn!("Unknown storage backend override: {}", other),
            }
        }
        if let Ok(val) = env::var("PV_CONF_STORAGE_LOCAL_PATH") {
            self.storage.local_path = val;
        }
        if let Ok(val) = env::var("PV_CONF_STORAGE_S3_ENDPOINT") {
            self.storage.s3.endpoint = val;
        }
        if let Ok(val) = env::var("PV_CONF_STORAGE_S3_ACCESS_KEY") {
            self.storage.s3.access_key = val;
        }
        if let Ok(val) = env::var("PV_CONF_STORAGE_S3_SECRET_KEY") {
            self.storage.s3.secret_key = val;
        }
        if let Ok(val) = env::var("PV_CONF_STORAGE_S3_BUCKET") {
            self.storage.s3.bucket = val;
        }
    }

    /// Ensure required directories exist
    fn ensure_directories(&self) -> anyhow::Result<()> {
        // Ensure database directory exists
        if let Some(parent) = Path::new(&self.database.path).parent() {
            fs::create_dir_all(parent)?;
        }

        // Ensure local storage directory exists
        if self.storage.backend == StorageBackend::Local {
            fs::create_dir_all(&self.storage.local_path)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_deployment() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.storage.backend, StorageBackend::Local);
        assert_eq!(config.storage.s3.bucket, "pdfs");
    }

    #[test]
    fn parses_storage_backend_from_toml() {
        let config: Config = toml::from_str("[storage]\nbackend = \"s3\"").unwrap();
        assert_eq!(config.storage.backend, StorageBackend::S3);
        // Unset sections fall back to defaults
        assert_eq!(config.server.host, "0.0.0.0");
    }
}
