// rest_api/src/config.rs

use anyhow::{Context, Result};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_REST_API_HOST: &str = "127.0.0.1";
pub const DEFAULT_REST_API_PORT: u16 = 8082;
pub const DEFAULT_DATABASE_URL: &str = "sled://./data/hospital";
pub const DEFAULT_AI_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_AI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_AI_TIMEOUT_SECS: u64 = 60;

/// Looked up next to the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "rest_api/rest_api_config.yaml";

/// Represents the configuration for the REST API server itself.
#[derive(Debug, Clone, Deserialize)]
pub struct RestApiConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub jwt_secret: String,
    pub database_url: String,
    #[serde(default)]
    pub ai_api_key: Option<String>,
    pub ai_model: String,
    pub ai_base_url: String,
    pub ai_timeout_secs: u64,
    pub token_ttl_hours: i64,
    #[serde(default)]
    pub roles_policy_path: Option<PathBuf>,
}

impl RestApiConfig {
    /// Rejects configurations the server cannot start with.
    pub fn validate(&self) -> Result<()> {
        if self.jwt_secret.trim().is_empty() {
            anyhow::bail!("JWT_SECRET must be set");
        }
        if self.token_ttl_hours <= 0 {
            anyhow::bail!("token_ttl_hours must be positive, got {}", self.token_ttl_hours);
        }
        Ok(())
    }

    /// The AI key, treating a blank value as absent.
    pub fn ai_api_key(&self) -> Option<&str> {
        self.ai_api_key.as_deref().map(str::trim).filter(|key| !key.is_empty())
    }
}

fn with_defaults() -> Result<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("host", DEFAULT_REST_API_HOST)?
        .set_default("port", DEFAULT_REST_API_PORT as i64)?
        .set_default("database_url", DEFAULT_DATABASE_URL)?
        .set_default("ai_model", DEFAULT_AI_MODEL)?
        .set_default("ai_base_url", DEFAULT_AI_BASE_URL)?
        .set_default("ai_timeout_secs", DEFAULT_AI_TIMEOUT_SECS as i64)?
        .set_default("token_ttl_hours", security::DEFAULT_TOKEN_TTL_HOURS)?)
}

fn finish(builder: ConfigBuilder<DefaultState>) -> Result<RestApiConfig> {
    let config: RestApiConfig = builder
        .build()
        .context("Failed to build REST API configuration")?
        .try_deserialize()
        .context("Failed to parse REST API configuration")?;
    config.validate()?;
    Ok(config)
}

/// Loads the REST API configuration: defaults, then the YAML file, then the
/// process environment (`JWT_SECRET`, `DATABASE_URL`, `AI_API_KEY`, ...).
/// An explicitly named file must exist; the default one is optional.
pub fn load_rest_api_config(config_path: Option<&Path>) -> Result<RestApiConfig> {
    let mut builder = with_defaults()?;
    match config_path {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file {} does not exist", path.display());
            }
            builder = builder.add_source(File::from(path));
        }
        None => {
            if Path::new(DEFAULT_CONFIG_FILE).exists() {
                builder = builder.add_source(File::with_name(DEFAULT_CONFIG_FILE));
            }
        }
    }
    builder = builder.add_source(Environment::default().try_parsing(true));
    finish(builder)
}
