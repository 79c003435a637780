//! User authentication
//!
//! - `service`: signup, login and refresh
//! - `hook`: post-signup notification of the profile service
//! - `handlers` / `middleware` / `extract`: HTTP surface

pub mod error;
pub mod extract;
pub mod handlers;
pub mod hook;
pub mod middleware;
pub mod models;
pub mod service;

pub use error::AuthError;
pub use hook::{NoopSignupHook, NotifyError, ProfileServiceNotifier, SignupHook};
pub use models::{LoginRequest, SignupRequest, TokenData};
pub use service::AuthenticationService;
