use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use thiserror::Error;

use crate::core_types::ExpiryMinutes;
use crate::token::codec::expires_at;
use crate::password::PasswordConfig;

/// Minimum HMAC secret length (HS256 key size).
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Failed to parse config yaml: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    pub jwt: JwtSettings,
    #[serde(default)]
    pub password: PasswordConfig,
    /// PostgreSQL connection URL; the in-memory store is used when absent
    #[serde(default)]
    pub postgres_url: Option<String>,
    /// Downstream profile service notified after signup
    #[serde(default)]
    pub user_service: Option<UserServiceConfig>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

/// Token signing settings, shared by access and refresh tokens except
/// for the secret and lifetime.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtSettings {
    pub access_token_secret: String,
    pub refresh_token_secret: String,
    pub issuer: String,
    pub audience: String,
    /// Minutes
    pub access_token_expiration: ExpiryMinutes,
    /// Minutes
    pub refresh_token_expiration: ExpiryMinutes,
    /// Reject refresh tokens superseded by a later issuance
    #[serde(default = "default_strict_rotation")]
    pub strict_rotation: bool,
}

fn default_strict_rotation() -> bool {
    true
}

/// What signup does when the profile service cannot be notified.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SignupFailurePolicy {
    /// Fail signup; the credential stays persisted.
    #[default]
    Propagate,
    /// Delete the credential, then fail signup.
    Compensate,
    /// Log and return the tokens anyway.
    Ignore,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserServiceConfig {
    /// Base URL; `Create` is appended for the profile creation call
    pub url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default)]
    pub retries: u32,
    #[serde(default)]
    pub failure_policy: SignupFailurePolicy,
}

fn default_timeout_ms() -> u64 {
    5000
}

impl JwtSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.access_token_secret.len() < MIN_SECRET_LEN
            || self.refresh_token_secret.len() < MIN_SECRET_LEN
        {
            return Err(ConfigError::Invalid(format!(
                "jwt secrets must be at least {} bytes",
                MIN_SECRET_LEN
            )));
        }
        if self.access_token_secret == self.refresh_token_secret {
            return Err(ConfigError::Invalid(
                "access and refresh token secrets must differ".into(),
            ));
        }
        if self.issuer.is_empty() || self.audience.is_empty() {
            return Err(ConfigError::Invalid(
                "jwt issuer and audience are required".into(),
            ));
        }
        if self.access_token_expiration <= 0 || self.refresh_token_expiration <= 0 {
            return Err(ConfigError::Invalid(
                "token expirations must be positive".into(),
            ));
        }
        let now = Utc::now();
        for minutes in [self.access_token_expiration, self.refresh_token_expiration] {
            if expires_at(now, minutes).is_none() {
                return Err(ConfigError::Invalid(format!(
                    "token expiration of {} minutes is out of range",
                    minutes
                )));
            }
        }
        Ok(())
    }
}

impl AppConfig {
    /// Load `config/{env}.yaml`, apply environment overrides and validate.
    pub fn load(env: &str) -> Result<Self, ConfigError> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path).map_err(|source| ConfigError::Read {
            path: config_path.clone(),
            source,
        })?;
        let mut config = Self::from_yaml(&content)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Secrets and endpoints that deployments inject through the environment.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("JWT_ACCESS_TOKEN_SECRET") {
            self.jwt.access_token_secret = v;
        }
        if let Some(v) = lookup("JWT_REFRESH_TOKEN_SECRET") {
            self.jwt.refresh_token_secret = v;
        }
        if let Some(v) = lookup("DATABASE_URL") {
            self.postgres_url = Some(v);
        }
        if let Some(v) = lookup("USER_SERVICE_URL") {
            match self.user_service.as_mut() {
                Some(svc) => svc.url = v,
                None => {
                    self.user_service = Some(UserServiceConfig {
                        url: v,
                        timeout_ms: default_timeout_ms(),
                        retries: 0,
                        failure_policy: SignupFailurePolicy::default(),
                    })
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.jwt.validate()?;
        if let Some(svc) = &self.user_service {
            if svc.url.is_empty() {
                return Err(ConfigError::Invalid("user_service.url is empty".into()));
            }
        }
        Ok(())
    }
}
