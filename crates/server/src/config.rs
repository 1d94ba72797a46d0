use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;
use store::BackendConfig;

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Server bind address
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum request body size in KiB
    #[serde(default = "default_max_body_size_kb")]
    pub max_body_size_kb: usize,

    /// Origins allowed by CORS. `*` allows any origin.
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[serde(default = "default_true")]
    pub log_json: bool,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Where notes are persisted.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// Database file, used by the `redb` backend
    #[serde(default = "default_storage_path")]
    pub path: String,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Redb,
    InMemory,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_storage_path(),
        }
    }
}

impl StorageConfig {
    pub fn backend_config(&self) -> BackendConfig {
        match self.backend {
            StorageBackend::Redb => BackendConfig::redb(self.path.clone()),
            StorageBackend::InMemory => BackendConfig::in_memory(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_kb: default_max_body_size_kb(),
            cors_origins: default_cors_origins(),
            log_level: default_log_level(),
            log_json: default_true(),
            storage: StorageConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from `.env`, an optional `notekeep` config file and
    /// `NOTEKEEP__*` environment variables, in increasing precedence.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("notekeep").required(false))
            // Override with environment variables
            .add_source(
                config::Environment::with_prefix("NOTEKEEP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("cors_origins")
                    .try_parsing(true),
            );

        let config: ServerConfig = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr_str = format!("{}:{}", self.bind_addr, self.port);
        Ok(addr_str.parse()?)
    }

    /// Get request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get max body size in bytes
    pub fn max_body_size(&self) -> usize {
        self.max_body_size_kb * 1024
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_kb() -> usize {
    64
}

fn default_cors_origins() -> Vec<String> {
    vec!["https://seen.red".to_string()]
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_storage_path() -> String {
    "notes.redb".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.max_body_size(), 64 * 1024);
        assert_eq!(cfg.cors_origins, vec!["https://seen.red"]);
        assert!(cfg.log_json);
        assert_eq!(cfg.storage.backend, StorageBackend::Redb);
        assert_eq!(cfg.storage.backend_config(), BackendConfig::redb("notes.redb"));
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let cfg: ServerConfig = serde_json::from_str(
            r#"{ "port": 8081, "storage": { "backend": "in_memory" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.port, 8081);
        assert_eq!(cfg.bind_addr, "0.0.0.0");
        assert_eq!(cfg.storage.backend_config(), BackendConfig::in_memory());
        assert_eq!(cfg.storage.path, "notes.redb");
    }
}
