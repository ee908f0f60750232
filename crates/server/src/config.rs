use contacts::BackendConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Which store the address book runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    #[default]
    Mongo,
    Redb,
    Memory,
}

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

    /// Maximum request body size in MB, CSV uploads included
    #[serde(default = "default_max_body_size_mb")]
    pub max_body_size_mb: usize,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub enable_cors: bool,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Storage backend
    #[serde(default)]
    pub backend: BackendKind,

    /// MongoDB connection string
    #[serde(default = "default_mongo_uri")]
    pub mongo_uri: String,

    /// MongoDB database name
    #[serde(default = "default_database")]
    pub database: String,

    /// MongoDB collection holding the entries
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Database file for the redb backend
    #[serde(default = "default_redb_path")]
    pub redb_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            max_body_size_mb: default_max_body_size_mb(),
            enable_cors: default_true(),
            log_level: default_log_level(),
            backend: BackendKind::default(),
            mongo_uri: default_mongo_uri(),
            database: default_database(),
            collection: default_collection(),
            redb_path: default_redb_path(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables and config files
    pub fn load() -> anyhow::Result<Self> {
        let env = config::Environment::with_prefix("CONTACTS_SERVER").separator("__");
        let builder = config::Config::builder()
            // Load from file if exists
            .add_source(config::File::with_name("server").required(false))
            // Override with environment variables
            .add_source(env);

        Ok(builder.build()?.try_deserialize()?)
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
        self.max_body_size_mb * 1024 * 1024
    }

    /// The store this configuration selects.
    pub fn backend(&self) -> BackendConfig {
        match self.backend {
            BackendKind::Mongo => {
                BackendConfig::mongo(&self.mongo_uri, &self.database, &self.collection)
            }
            BackendKind::Redb => BackendConfig::redb(&self.redb_path),
            BackendKind::Memory => BackendConfig::in_memory(),
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_max_body_size_mb() -> usize {
    10
}

fn default_true() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_mongo_uri() -> String {
    "mongodb://localhost:27017".to_string()
}

fn default_database() -> String {
    "addressbook".to_string()
}

fn default_collection() -> String {
    "entries".to_string()
}

fn default_redb_path() -> String {
    "contacts.redb".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let cfg = ServerConfig::default();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.timeout_secs, 30);
        assert_eq!(cfg.max_body_size_mb, 10);
        assert_eq!(cfg.max_body_size(), 10 * 1024 * 1024);
        assert!(cfg.enable_cors);
        assert_eq!(cfg.backend, BackendKind::Mongo);
        assert_eq!(cfg.database, "addressbook");
        assert_eq!(cfg.collection, "entries");
    }

    #[test]
    fn test_socket_addr() {
        let cfg = ServerConfig::default();
        let addr = cfg.socket_addr().unwrap();
        assert_eq!(addr.port(), 8080);
    }

    #[test]
    fn test_missing_fields_take_defaults() {
        let file = r#"{"port": 9000, "backend": "memory"}"#;
        let cfg: ServerConfig = serde_json::from_str(file).unwrap();
        assert_eq!(cfg.port, 9000);
        assert_eq!(cfg.bind_addr, "0.0.0.0");
        assert!(matches!(cfg.backend(), BackendConfig::InMemory));
    }

    #[test]
    fn test_backend_selection() {
        let cfg = ServerConfig {
            backend: BackendKind::Redb,
            redb_path: "/tmp/book.redb".into(),
            ..ServerConfig::default()
        };
        match cfg.backend() {
            BackendConfig::Redb { path } => assert_eq!(path, "/tmp/book.redb"),
            other => panic!("unexpected backend {other:?}"),
        }

        match ServerConfig::default().backend() {
            BackendConfig::Mongo {
                uri,
                database,
                collection,
            } => {
                assert_eq!(uri, "mongodb://localhost:27017");
                assert_eq!(database, "addressbook");
                assert_eq!(collection, "entries");
            }
            other => panic!("unexpected backend {other:?}"),
        }
    }
}
