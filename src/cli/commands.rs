//! CLI command implementations

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::api::{self, AppState};
use crate::auth::{hash_password, normalize_email, TokenService};
use crate::cli::{error, info, success, warn};
use crate::config::{self, Config};
use crate::error::Error;
use crate::store::MemoryStore;

/// Initialize a new tallyboard.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = Path::new(config::loader::CONFIG_FILENAME);

    if config_path.exists() {
        warn("tallyboard.toml already exists");
        return Ok(());
    }

    fs::write(config_path, config::loader::default_config_content())?;

    success("Created tallyboard.toml");
    info("Set TALLYBOARD_JWT_SECRET and run 'tallyboard serve' to start the API");

    Ok(())
}

/// Run the HTTP API
pub async fn serve(
    config_path: Option<PathBuf>,
    host: Option<String>,
    port: Option<u16>,
    memory: bool,
) -> Result<()> {
    let config = load_config(config_path)?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info(&format!("Starting server at http://{}:{}", host, port));

    if memory {
        warn("Using in-memory storage; data is lost on exit");
        let state = Arc::new(AppState::new(config, Arc::new(MemoryStore::new()))?);
        let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;
        api::serve(listener, state).await?;
    } else if let Err(e) = api::run_server(config, &host, port).await {
        error(&format!("Server stopped: {}", e));
        return Err(e.into());
    }

    Ok(())
}

/// Print a bcrypt hash, e.g. for seeding a user row by hand
pub async fn hash(config_path: Option<PathBuf>, password: &str) -> Result<()> {
    let cost = bcrypt_cost(config_path)?;
    let hashed = hash_password(password, cost).await?;
    println!("{}", hashed);
    Ok(())
}

/// Print a token for `email` signed with the configured active key
pub async fn issue_token(config_path: Option<PathBuf>, email: &str) -> Result<()> {
    let config = load_config(config_path)?;
    let tokens = TokenService::from_config(&config.auth)?;
    let token = tokens.issue(&normalize_email(email))?;

    println!("{}", token);
    Ok(())
}

/// Cost from the config file. Without an explicit path and with no file
/// found, the default cost applies.
fn bcrypt_cost(path: Option<PathBuf>) -> Result<u32> {
    let config = match path {
        Some(path) => config::load_config_from_path(&path),
        None => match config::load_config() {
            Err(Error::ConfigNotFound) => Ok(Config::default()),
            other => other,
        },
    };
    config
        .map(|c| c.auth.bcrypt_cost)
        .map_err(|e| anyhow::anyhow!("{}", e))
}

fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => config::load_config_from_path(&path),
        None => config::load_config(),
    };
    config.map_err(|e| anyhow::anyhow!("{}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bcrypt_cost_from_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(config::loader::CONFIG_FILENAME);
        fs::write(
            &path,
            r#"
[auth]
bcrypt_cost = 5
active_key = "k"

[[auth.keys]]
kid = "k"
secret = "s"
"#,
        )
        .unwrap();

        assert_eq!(bcrypt_cost(Some(path)).unwrap(), 5);
    }

    #[test]
    fn test_bcrypt_cost_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(bcrypt_cost(Some(dir.path().join("absent.toml"))).is_err());
    }
}
