//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Database configuration.
    pub database: DatabaseConfig,
    /// Web Push configuration.
    pub push: PushConfig,
    /// Bootstrap account configuration.
    #[serde(default)]
    pub bootstrap: BootstrapConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to bind to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Public URL of this instance, used to build tracking links.
    pub url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Database connection configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `PostgreSQL` connection URL.
    pub url: String,
    /// Maximum number of connections in the pool.
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// Minimum number of connections in the pool.
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Web Push (VAPID) configuration.
///
/// When the keys are absent, dispatches are wired to a no-op gateway so the
/// rest of the API stays usable in development.
#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// VAPID public key (base64 URL-safe encoded).
    #[serde(default)]
    pub vapid_public_key: Option<String>,
    /// VAPID private key (base64 URL-safe encoded).
    #[serde(default)]
    pub vapid_private_key: Option<String>,
    /// VAPID subject (a mailto: or https: URL).
    #[serde(default = "default_vapid_subject")]
    pub subject: String,
    /// Default notification icon URL.
    #[serde(default = "default_icon")]
    pub default_icon: String,
    /// Default notification tag.
    #[serde(default = "default_tag")]
    pub default_tag: String,
}

/// Bootstrap account configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BootstrapConfig {
    /// Username of the super admin created on first boot.
    #[serde(default)]
    pub super_admin_username: Option<String>,
    /// Password of the super admin created on first boot.
    #[serde(default)]
    pub super_admin_password: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

const fn default_port() -> u16 {
    3000
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_max_connections() -> u32 {
    100
}

const fn default_min_connections() -> u32 {
    5
}

fn default_vapid_subject() -> String {
    "mailto:admin@pulso.local".to_string()
}

fn default_icon() -> String {
    "/icon-192.png".to_string()
}

fn default_tag() -> String {
    "pulso-notification".to_string()
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `config/default.toml`
    /// 2. `config/{environment}.toml` (based on `PULSO_ENV`)
    /// 3. Environment variables with `PULSO_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let env = std::env::var("PULSO_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("PULSO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("PULSO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
