//! Core types used throughout the system
//!
//! These are fundamental type aliases used by all modules.
//! They provide semantic meaning and enable future type evolution.

use uuid::Uuid;

/// User ID - globally unique, immutable after assignment.
///
/// # Usage:
/// - Primary key for user credentials
/// - Foreign key of the refresh token record
/// - `sub` claim of every issued token
pub type UserId = Uuid;

/// Refresh token record ID - opaque, assigned when the first
/// refresh token for a user is stored.
pub type RecordId = Uuid;

/// Token lifetime in minutes, as configured.
///
/// Signed so that tests can issue already-expired tokens.
pub type ExpiryMinutes = i64;
