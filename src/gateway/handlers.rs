//! Gateway-level handlers. Auth handlers live in `user_auth::handlers`.

mod health;

pub use health::*;
