//! Gateway types module
//!
//! ## Submodules
//! - [`response`]: Response envelope and error codes

pub mod response;

pub use response::{ApiResponse, error_codes};
