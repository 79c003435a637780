//! Password hashing
//!
//! argon2id with a random salt per hash. The output is a PHC string
//! (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`) so parameters and salt
//! travel with the hash and old hashes stay verifiable after a cost change.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{
        PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasswordError {
    #[error("Invalid argon2 parameters: {0}")]
    Params(String),

    #[error("Hashing failed: {0}")]
    Hash(String),
}

/// argon2 cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_kib: Params::DEFAULT_M_COST,
            iterations: Params::DEFAULT_T_COST,
            parallelism: Params::DEFAULT_P_COST,
        }
    }
}

/// One-way salted password hashing with verification.
#[derive(Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    pub fn new(config: PasswordConfig) -> Result<Self, PasswordError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| PasswordError::Params(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password into a PHC string.
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?;
        Ok(hash.to_string())
    }

    /// Check `plaintext` against a stored PHC string.
    ///
    /// An unparseable hash is treated as a mismatch.
    pub fn verify(&self, plaintext: &str, hashed: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(hashed) else {
            tracing::warn!("Stored password hash is not a valid PHC string");
            return false;
        };
        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            argon2: Argon2::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> PasswordHasher {
        PasswordHasher::new(PasswordConfig {
            memory_kib: 1024,
            iterations: 1,
            parallelism: 1,
        })
        .unwrap()
    }

    #[test]
    fn test_verify_matching_password() {
        let hasher = fast_hasher();
        for pw in ["pw1", "correct horse battery staple", "пароль", ""] {
            let hash = hasher.hash(pw).unwrap();
            assert!(hasher.verify(pw, &hash), "password {:?} should verify", pw);
        }
    }

    #[test]
    fn test_verify_rejects_other_password() {
        let hasher = fast_hasher();
        let hash = hasher.hash("pw1").unwrap();
        for wrong in ["pw2", "PW1", "pw1 ", "", "pw"] {
            assert!(!hasher.verify(wrong, &hash), "{:?} must not verify", wrong);
        }
    }

    #[test]
    fn test_same_password_hashes_differ() {
        let hasher = fast_hasher();
        let a = hasher.hash("pw1").unwrap();
        let b = hasher.hash("pw1").unwrap();
        assert_ne!(a, b, "salt must make hashes unique");
        assert!(a.starts_with("$argon2id$"));
    }

    #[test]
    fn test_garbage_hash_is_mismatch() {
        let hasher = fast_hasher();
        assert!(!hasher.verify("pw1", "not-a-phc-string"));
        assert!(!hasher.verify("pw1", ""));
    }

    #[test]
    fn test_hash_verifies_across_cost_settings() {
        let hash = fast_hasher().hash("pw1").unwrap();
        // Parameters are read from the PHC string, not from the verifier
        assert!(PasswordHasher::default().verify("pw1", &hash));
    }

    #[test]
    fn test_invalid_params_rejected() {
        let err = PasswordHasher::new(PasswordConfig {
            memory_kib: 1,
            iterations: 0,
            parallelism: 1,
        });
        assert!(matches!(err, Err(PasswordError::Params(_))));
    }
}
