use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Public base URL used to build `Location` headers. When unset, the
    /// request's Host header is used.
    #[serde(default)]
    pub public_url: Option<String>,

    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// Require credentials on every API request
    #[serde(default)]
    pub enabled: bool,

    /// Accounts allowed to store fragments
    #[serde(default)]
    pub users: Vec<UserConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UserConfig {
    pub username: String,

    /// Bcrypt hash of the password (generate with `fragstore hash-password`)
    pub password_hash: String,

    /// Optional API key for programmatic access (used with
    /// Authorization: Bearer header; generate with `fragstore generate-api-key`)
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,

    /// SQLite database path (only used by the sqlite backend)
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Process-local storage, lost on restart
    Memory,
    /// SQLite file storage
    #[default]
    Sqlite,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./fragstore.db")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_url: None,
            auth: AuthConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            db_path: default_db_path(),
        }
    }
}
