//! Token module
//!
//! - `claims`: registered claims and the access/refresh bodies
//! - `codec`: HS256 sign/parse/verify with zero leeway
//! - `error`: typed verification failures
//! - `service`: issuance and validation of access and refresh tokens

pub mod claims;
pub mod codec;
pub mod error;
pub mod service;

pub use claims::{AccessClaims, Claims, RefreshClaims};
pub use codec::TokenCodec;
pub use error::{IssueError, TokenError};
pub use service::TokenService;
