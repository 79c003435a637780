//! Security Service
//!
//! ```text
//! ┌──────────┐    ┌──────────────┐    ┌───────────────┐    ┌──────────────┐
//! │ Gateway  │───▶│ AuthService  │───▶│ TokenService  │───▶│ Credential   │
//! │ (axum)   │    │ (hash/hook)  │    │ (JWT HS256)   │    │ Store (PG/mem)│
//! └──────────┘    └──────────────┘    └───────────────┘    └──────────────┘
//! ```
//!
//! Usage: `security_service [--env dev] [--port 8080]`

use anyhow::Context;
use std::sync::Arc;

use security_service::config::AppConfig;
use security_service::credential::{CredentialStore, MemoryCredentialStore, PgCredentialStore};
use security_service::db::Database;
use security_service::gateway::{self, state::AppState};
use security_service::password::PasswordHasher;
use security_service::token::TokenService;
use security_service::user_auth::{AuthenticationService, ProfileServiceNotifier, SignupHook};

fn get_env() -> String {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if (args[i] == "--env" || args[i] == "-e") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    "dev".to_string()
}

/// Get port override from command line (--port argument)
fn get_port_override() -> Option<u16> {
    let args: Vec<String> = std::env::args().collect();
    for i in 0..args.len() {
        if args[i] == "--port" && i + 1 < args.len() {
            return args[i + 1].parse().ok();
        }
    }
    None
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = get_env();
    let mut app_config =
        AppConfig::load(&env).with_context(|| format!("loading config for env '{}'", env))?;
    if let Some(port) = get_port_override() {
        app_config.gateway.port = port;
    }
    let _log_guard = security_service::logging::init_logging(&app_config);

    tracing::info!("Starting Security Service in {} mode", env);

    // Credential store
    let (store, pg_db): (Arc<dyn CredentialStore>, Option<Arc<Database>>) =
        match app_config.postgres_url {
            Some(ref url) => {
                let db = Arc::new(
                    Database::connect(url)
                        .await
                        .context("connecting to PostgreSQL")?,
                );
                db.ensure_schema().await.context("creating schema")?;
                (Arc::new(PgCredentialStore::new(db.clone())), Some(db))
            }
            None => {
                tracing::warn!("No postgres_url configured, using in-memory credential store");
                (Arc::new(MemoryCredentialStore::new()), None)
            }
        };

    let tokens = Arc::new(TokenService::new(&app_config.jwt, store.clone()));
    let hasher = PasswordHasher::new(app_config.password.clone())?;
    let mut auth = AuthenticationService::new(store, tokens, hasher);

    // Post-signup hook
    if let Some(ref svc) = app_config.user_service {
        let hook: Arc<dyn SignupHook> = Arc::new(ProfileServiceNotifier::new(svc)?);
        tracing::info!(
            "Profile service notifications enabled ({:?} on failure, {} retries)",
            svc.failure_policy,
            svc.retries
        );
        auth = auth.with_signup_hook(hook, svc.failure_policy, svc.retries);
    }

    let state = Arc::new(AppState::new(Arc::new(auth), pg_db));
    gateway::run_server(&app_config.gateway, state).await?;
    Ok(())
}
