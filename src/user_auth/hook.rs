//! Post-signup hook
//!
//! Runs after a credential is persisted and its first token pair issued.
//! What a failed hook means for the signup is decided by
//! [`SignupFailurePolicy`](crate::config::SignupFailurePolicy), not by the hook.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use super::models::TokenData;
use crate::config::UserServiceConfig;
use crate::credential::UserCredential;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Profile service responded with status {0}")]
    Status(u16),
}

#[async_trait]
pub trait SignupHook: Send + Sync {
    async fn user_created(
        &self,
        user: &UserCredential,
        tokens: &TokenData,
    ) -> Result<(), NotifyError>;
}

/// Used when no profile service is configured.
pub struct NoopSignupHook;

#[async_trait]
impl SignupHook for NoopSignupHook {
    async fn user_created(
        &self,
        _user: &UserCredential,
        _tokens: &TokenData,
    ) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Asks the user/profile service to create the profile of a new user,
/// authenticating with the user's fresh access token.
pub struct ProfileServiceNotifier {
    client: reqwest::Client,
    create_url: String,
}

impl ProfileServiceNotifier {
    pub fn new(config: &UserServiceConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| NotifyError::Transport(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            create_url: format!("{}Create", config.url),
        })
    }

    pub fn create_url(&self) -> &str {
        &self.create_url
    }
}

#[async_trait]
impl SignupHook for ProfileServiceNotifier {
    async fn user_created(
        &self,
        user: &UserCredential,
        tokens: &TokenData,
    ) -> Result<(), NotifyError> {
        let response = self
            .client
            .post(&self.create_url)
            .bearer_auth(&tokens.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&"")
            .send()
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(user_id = %user.id, "Profile creation rejected: {}", status);
            return Err(NotifyError::Status(status.as_u16()));
        }

        tracing::debug!(user_id = %user.id, "Profile service notified");
        Ok(())
    }
}
