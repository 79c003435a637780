use std::sync::Arc;
use tracing::{error, info, warn};
use validator::Validate;

use super::error::AuthError;
use super::hook::{NoopSignupHook, NotifyError, SignupHook};
use super::models::{LoginRequest, SignupRequest, TokenData};
use crate::config::SignupFailurePolicy;
use crate::core_types::UserId;
use crate::credential::{CredentialStore, UserCredential};
use crate::password::PasswordHasher;
use crate::token::TokenService;

/// Signup, login and refresh-token exchange.
pub struct AuthenticationService {
    store: Arc<dyn CredentialStore>,
    tokens: Arc<TokenService>,
    hasher: PasswordHasher,
    hook: Arc<dyn SignupHook>,
    failure_policy: SignupFailurePolicy,
    notify_retries: u32,
}

impl AuthenticationService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        tokens: Arc<TokenService>,
        hasher: PasswordHasher,
    ) -> Self {
        Self {
            store,
            tokens,
            hasher,
            hook: Arc::new(NoopSignupHook),
            failure_policy: SignupFailurePolicy::default(),
            notify_retries: 0,
        }
    }

    /// Install the post-signup hook and what to do when it keeps failing.
    pub fn with_signup_hook(
        mut self,
        hook: Arc<dyn SignupHook>,
        failure_policy: SignupFailurePolicy,
        notify_retries: u32,
    ) -> Self {
        self.hook = hook;
        self.failure_policy = failure_policy;
        self.notify_retries = notify_retries;
        self
    }

    pub fn tokens(&self) -> &Arc<TokenService> {
        &self.tokens
    }

    /// Register a new user and issue its first token pair.
    pub async fn sign_up(&self, req: SignupRequest) -> Result<TokenData, AuthError> {
        req.validate()
            .map_err(|e| AuthError::Validation(e.to_string()))?;

        // 1. Hash password off the async workers
        let hasher = self.hasher.clone();
        let password = req.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::Internal(format!("hashing task failed: {}", e)))??;

        // 2. Persist; unique indexes reject taken usernames/emails
        let credential = UserCredential::new(req.username, req.email, password_hash);
        if let Err(e) = self.store.create_credential(&credential).await {
            warn!("Signup rejected: {}", e);
            return Err(e.into());
        }
        info!(user_id = %credential.id, "User credential created");

        // 3. Tokens
        let tokens = match self.authenticate(credential.id).await {
            Ok(tokens) => tokens,
            Err(e) => {
                if self.failure_policy == SignupFailurePolicy::Compensate {
                    self.roll_back(credential.id, &e).await;
                }
                return Err(e);
            }
        };

        // 4. Post-commit hook
        self.notify_signup(&credential, &tokens).await?;

        Ok(tokens)
    }

    /// Log in by username or email.
    ///
    /// Returns `None` unless exactly one matching credential verifies.
    pub async fn log_in(&self, req: LoginRequest) -> Result<Option<TokenData>, AuthError> {
        let candidates = self
            .store
            .find_by_username_or_email(&req.username_email)
            .await?;
        if candidates.is_empty() {
            info!("Login failed: no credential for given username/email");
            return Ok(None);
        }

        let hasher = self.hasher.clone();
        let password = req.password;
        let verified: Vec<UserId> = tokio::task::spawn_blocking(move || {
            candidates
                .into_iter()
                .filter(|c| hasher.verify(&password, &c.password))
                .map(|c| c.id)
                .collect()
        })
        .await
        .map_err(|e| AuthError::Internal(format!("verification task failed: {}", e)))?;

        match verified.as_slice() {
            [user_id] => {
                let tokens = self.authenticate(*user_id).await?;
                info!(user_id = %user_id, "User logged in");
                Ok(Some(tokens))
            }
            [] => {
                info!("Login failed: password mismatch");
                Ok(None)
            }
            many => {
                warn!("Login failed: {} credentials verified for one login", many.len());
                Ok(None)
            }
        }
    }

    /// Exchange a refresh token (plus the access token it was issued with)
    /// for a new pair. The stored refresh token is overwritten.
    pub async fn refresh_token(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<TokenData, AuthError> {
        if !self
            .tokens
            .validate_refresh_token(refresh_token, access_token)
            .await?
        {
            return Err(AuthError::InvalidToken);
        }

        let user_id = self
            .tokens
            .subject_of(access_token)
            .ok_or(AuthError::InvalidToken)?;

        let tokens = self.authenticate(user_id).await?;
        info!(user_id = %user_id, "Token pair refreshed");
        Ok(tokens)
    }

    async fn authenticate(&self, user_id: UserId) -> Result<TokenData, AuthError> {
        let access_token = self
            .tokens
            .issue_access_token(user_id)
            .await?
            .ok_or(AuthError::UnknownUser)?;
        let refresh_token = self.tokens.issue_refresh_token(user_id).await?;

        Ok(TokenData {
            access_token,
            refresh_token,
        })
    }

    async fn notify_signup(
        &self,
        credential: &UserCredential,
        tokens: &TokenData,
    ) -> Result<(), AuthError> {
        let mut attempt = 0;
        let err = loop {
            match self.hook.user_created(credential, tokens).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.notify_retries => {
                    attempt += 1;
                    warn!(user_id = %credential.id, attempt, "Signup hook failed, retrying: {}", e);
                }
                Err(e) => break e,
            }
        };

        self.apply_failure_policy(credential, err).await
    }

    async fn apply_failure_policy(
        &self,
        credential: &UserCredential,
        err: NotifyError,
    ) -> Result<(), AuthError> {
        match self.failure_policy {
            SignupFailurePolicy::Propagate => {
                error!(
                    user_id = %credential.id,
                    "Signup hook failed; credential stays persisted: {}", err
                );
                Err(AuthError::DownstreamNotificationFailure(err.to_string()))
            }
            SignupFailurePolicy::Compensate => {
                self.roll_back(credential.id, &err).await;
                Err(AuthError::DownstreamNotificationFailure(err.to_string()))
            }
            SignupFailurePolicy::Ignore => {
                warn!(user_id = %credential.id, "Signup hook failed, ignored: {}", err);
                Ok(())
            }
        }
    }

    /// Delete a just-created credential (and its refresh record).
    async fn roll_back(&self, user_id: UserId, cause: &(dyn std::fmt::Display + Sync)) {
        match self.store.delete_credential(user_id).await {
            Ok(_) => warn!(user_id = %user_id, "Signup rolled back: {}", cause),
            Err(e) => error!(
                user_id = %user_id,
                "Signup rollback failed ({}) after: {}", e, cause
            ),
        }
    }
}
