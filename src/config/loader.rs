//! Configuration loading and environment variable interpolation

use crate::error::{Error, Result};
use regex::Regex;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use super::Config;

pub const CONFIG_FILENAME: &str = "tallyboard.toml";

/// Load configuration from tallyboard.toml
pub fn load_config() -> Result<Config> {
    let config_path = find_config_file()?;
    load_config_from_path(&config_path)
}

/// Load configuration from a specific path
pub fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path).map_err(|_| Error::ConfigNotFound)?;
    parse_config(&content)
}

/// Parse configuration text, expanding environment variables first
pub fn parse_config(content: &str) -> Result<Config> {
    let content = interpolate_env_vars(content);
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

/// Find the configuration file, searching upward from current directory
fn find_config_file() -> Result<PathBuf> {
    let mut current = env::current_dir().map_err(|e| Error::Config(e.to_string()))?;

    loop {
        let config_path = current.join(CONFIG_FILENAME);
        if config_path.exists() {
            return Ok(config_path);
        }

        if !current.pop() {
            return Err(Error::ConfigNotFound);
        }
    }
}

/// Interpolate environment variables in the format ${VAR_NAME} or ${VAR_NAME:-default}
fn interpolate_env_vars(content: &str) -> String {
    // This regex is a compile-time constant, panicking is acceptable here
    // as it indicates a programming error in the codebase, not a runtime issue
    let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)(?::-([^}]*))?\}")
        .expect("Invalid regex pattern - this is a bug in the codebase");

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        let default = caps.get(2).map(|m| m.as_str()).unwrap_or("");

        env::var(var_name).unwrap_or_else(|_| default.to_string())
    })
    .to_string()
}

/// Generate a default configuration file content
pub fn default_config_content() -> &'static str {
    r#"# Tallyboard Configuration

[server]
host = "0.0.0.0"
port = 8000

[database]
url = "host=${DB_HOST:-localhost} port=${DB_PORT:-5432} user=${DB_USER:-postgres} password=${DB_PASSWORD:-postgres} dbname=${DB_NAME:-todoapp}"

[auth]
token_ttl_secs = 3600
bcrypt_cost = 10
# Answer failed logins with 200 + {"detail": ...} like older clients expect
legacy_login_status = false
active_key = "primary"

[[auth.keys]]
kid = "primary"
secret = "${TALLYBOARD_JWT_SECRET}"

# To rotate: add a new key, point active_key at it, and drop the old key
# once every token it signed has expired.
# [[auth.keys]]
# kid = "next"
# secret = "${TALLYBOARD_JWT_SECRET_NEXT}"
"#
}
