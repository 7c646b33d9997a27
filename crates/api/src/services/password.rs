//! Credential hashing.
//!
//! One canonical scheme for every call site: Argon2id PHC strings
//! (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`). Registration, worker
//! creation, password changes, login and the CLI all go through
//! [`CredentialHasher`], so stored hashes are always interchangeable.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

use crate::config::HashingConfig;

/// Errors produced while hashing (verification never errors).
#[derive(Debug, Error)]
pub enum HashError {
    /// Cost parameters rejected by argon2.
    #[error("invalid password hashing parameters: {0}")]
    Params(String),

    /// Hash computation failed.
    #[error("password hashing failed")]
    Hash,
}

/// Salted Argon2id password hasher.
///
/// Cheap to clone; held in application state and built once from
/// configuration.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
}

impl CredentialHasher {
    /// Build a hasher from cost parameters, filling gaps with argon2 defaults.
    ///
    /// # Errors
    ///
    /// Returns `HashError::Params` if argon2 rejects the combination.
    pub fn new(config: &HashingConfig) -> Result<Self, HashError> {
        let defaults = Params::default();
        let params = Params::new(
            config.memory_kib.unwrap_or_else(|| defaults.m_cost()),
            config.iterations.unwrap_or_else(|| defaults.t_cost()),
            config.parallelism.unwrap_or_else(|| defaults.p_cost()),
            None,
        )
        .map_err(|e| HashError::Params(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hash a plaintext password with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns `HashError::Hash` if argon2 fails.
    pub fn hash(&self, plaintext: &str) -> Result<String, HashError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| HashError::Hash)
    }

    /// Check `plaintext` against a stored hash.
    ///
    /// Returns `false` on mismatch and for anything that is not an Argon2id
    /// PHC string. The cost parameters are read from the stored hash, so
    /// hashes created under older settings keep verifying.
    #[must_use]
    pub fn verify(&self, plaintext: &str, stored: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored) else {
            tracing::warn!("Stored password hash is not a PHC string");
            return false;
        };

        if parsed.algorithm != Algorithm::Argon2id.ident() {
            tracing::warn!(algorithm = %parsed.algorithm, "Stored password hash uses a non-canonical algorithm");
            return false;
        }

        self.argon2
            .verify_password(plaintext.as_bytes(), &parsed)
            .is_ok()
    }
}

impl std::fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let params = self.argon2.params();
        f.debug_struct("CredentialHasher")
            .field("algorithm", &"argon2id")
            .field("m_cost", &params.m_cost())
            .field("t_cost", &params.t_cost())
            .field("p_cost", &params.p_cost())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Low-cost hasher so tests stay fast.
    pub(crate) fn fast_hasher() -> CredentialHasher {
        CredentialHasher::new(&HashingConfig {
            memory_kib: Some(1024),
            iterations: Some(1),
            parallelism: Some(1),
        })
        .unwrap()
    }

    #[test]
    fn test_hash_then_verify() {
        let hasher = fast_hasher();
        let hash = hasher.hash("clave-segura-123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify("clave-segura-123", &hash));
    }

    #[test]
    fn test_verify_rejects_other_password() {
        let hasher = fast_hasher();
        let hash = hasher.hash("clave-segura-123").unwrap();

        assert!(!hasher.verify("clave-segura-124", &hash));
        assert!(!hasher.verify("", &hash));
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = fast_hasher();
        let first = hasher.hash("repetida").unwrap();
        let second = hasher.hash("repetida").unwrap();

        assert_ne!(first, second);
        assert!(hasher.verify("repetida", &first));
        assert!(hasher.verify("repetida", &second));
    }

    #[test]
    fn test_verify_accepts_hash_from_different_costs() {
        let stronger = CredentialHasher::new(&HashingConfig {
            memory_kib: Some(2048),
            iterations: Some(2),
            parallelism: Some(1),
        })
        .unwrap();
        let hash = stronger.hash("migrada").unwrap();

        assert!(fast_hasher().verify("migrada", &hash));
    }

    #[test]
    fn test_verify_returns_false_for_garbage_and_other_schemes() {
        let hasher = fast_hasher();

        assert!(!hasher.verify("x", ""));
        assert!(!hasher.verify("x", "texto-plano"));
        // bcrypt-format hashes are not part of the canonical scheme
        assert!(!hasher.verify(
            "x",
            "$2b$12$R9h/cIPz0gi.URNNX3kh2OPST9/PgBkqquzi.Ss7KIUgO2t0jWMUW"
        ));
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let result = CredentialHasher::new(&HashingConfig {
            memory_kib: Some(1),
            iterations: Some(0),
            parallelism: Some(1),
        });
        assert!(matches!(result, Err(HashError::Params(_))));
    }

    #[test]
    fn test_debug_shows_costs() {
        let debug = format!("{:?}", fast_hasher());
        assert!(debug.contains("argon2id"));
        assert!(debug.contains("1024"));
    }
}
