//! Configuration schema definitions

use serde::{Deserialize, Serialize};

use crate::auth::password::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::error::{Error, Result};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub database: DatabaseConfig,

    #[serde(default)]
    pub auth: AuthConfig,
}

/// Server configuration for the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// PostgreSQL connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// libpq-style connection string, e.g. `host=localhost user=postgres dbname=todoapp`
    #[serde(default = "default_database_url")]
    pub url: String,
}

fn default_database_url() -> String {
    "host=localhost port=5432 user=postgres password=postgres dbname=todoapp".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

/// Token signing and password hashing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Lifetime of an issued token
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: i64,

    #[serde(default = "default_bcrypt_cost")]
    pub bcrypt_cost: u32,

    /// Answer failed logins with 200 and a `detail` body instead of 401
    #[serde(default)]
    pub legacy_login_status: bool,

    /// Key id used to sign new tokens
    #[serde(default = "default_active_key")]
    pub active_key: String,

    /// All keys accepted for verification. Retired keys stay here until
    /// the tokens they signed have expired.
    #[serde(default)]
    pub keys: Vec<SigningKey>,
}

fn default_token_ttl_secs() -> i64 {
    3600
}

fn default_bcrypt_cost() -> u32 {
    10
}

fn default_active_key() -> String {
    "primary".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            token_ttl_secs: default_token_ttl_secs(),
            bcrypt_cost: default_bcrypt_cost(),
            legacy_login_status: false,
            active_key: default_active_key(),
            keys: Vec::new(),
        }
    }
}

/// A named HMAC secret
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SigningKey {
    pub kid: String,
    pub secret: String,
}

impl AuthConfig {
    /// Get a signing key by id
    pub fn get_key(&self, kid: &str) -> Option<&SigningKey> {
        self.keys.iter().find(|k| k.kid == kid)
    }
}

impl Config {
    /// Check the settings that cannot be defaulted sensibly
    pub fn validate(&self) -> Result<()> {
        let auth = &self.auth;

        if auth.keys.is_empty() {
            return Err(Error::Config(
                "auth.keys must contain at least one signing key".to_string(),
            ));
        }

        if let Some(key) = auth.keys.iter().find(|k| k.secret.trim().is_empty()) {
            return Err(Error::Config(format!(
                "Signing key '{}' has an empty secret",
                key.kid
            )));
        }

        if auth.get_key(&auth.active_key).is_none() {
            return Err(Error::Config(format!(
                "auth.active_key '{}' is not listed in auth.keys",
                auth.active_key
            )));
        }

        if auth.token_ttl_secs <= 0 {
            return Err(Error::Config(
                "auth.token_ttl_secs must be positive".to_string(),
            ));
        }

        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&auth.bcrypt_cost) {
            return Err(Error::Config(format!(
                "auth.bcrypt_cost must be between {} and {}",
                MIN_BCRYPT_COST,
                MAX_BCRYPT_COST
            )));
        }

        Ok(())
    }
}
