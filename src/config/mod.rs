mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    // Try default locations
    let default_paths = [
        "./config.toml",
        "./fragstore.toml",
        "~/.config/fragstore/config.toml",
        "/etc/fragstore/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    // Return default config if no file found
    Ok(Config::default())
}

/// Validate configuration
fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.server.auth.enabled && config.server.auth.users.is_empty() {
        anyhow::bail!("Auth is enabled but no users are configured");
    }

    for user in &config.server.auth.users {
        if user.username.is_empty() {
            anyhow::bail!("Auth user with empty username");
        }
        if user.password_hash.is_empty() {
            anyhow::bail!("Auth user '{}' has no password hash", user.username);
        }
    }

    let mut usernames: Vec<&str> = config
        .server
        .auth
        .users
        .iter()
        .map(|u| u.username.as_str())
        .collect();
    usernames.sort_unstable();
    usernames.dedup();
    if usernames.len() != config.server.auth.users.len() {
        anyhow::bail!("Duplicate usernames in auth config");
    }

    Ok(())
}
