//! Password hashing command.
//!
//! Reads one password from stdin and prints its Argon2id hash, using the
//! same `FERREMAS_HASH_*` cost parameters as the API.
//!
//! ```bash
//! printf '%s' 'clave-segura' | ferremas-cli hash-password
//! ```

use std::io::BufRead;

use ferremas_api::config::{ConfigError, HashingConfig};
use ferremas_api::services::auth::{AuthError, validate_password};
use ferremas_api::services::password::{CredentialHasher, HashError};
use thiserror::Error;

/// Errors that can occur while hashing from the command line.
#[derive(Debug, Error)]
pub enum PasswordCommandError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read stdin: {0}")]
    Io(#[from] std::io::Error),

    #[error("No password given on stdin")]
    Empty,

    #[error(transparent)]
    Weak(#[from] AuthError),

    #[error(transparent)]
    Hash(#[from] HashError),
}

/// Hash the first line of `input`.
///
/// # Errors
///
/// Returns `PasswordCommandError::Empty` if the line is empty and
/// `PasswordCommandError::Weak` if the API would refuse it.
pub fn hash_line(hasher: &CredentialHasher, input: impl BufRead) -> Result<String, PasswordCommandError> {
    let line = input.lines().next().transpose()?.unwrap_or_default();
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(PasswordCommandError::Empty);
    }
    validate_password(password)?;

    Ok(hasher.hash(password)?)
}

/// Read a password from stdin and print its hash.
///
/// # Errors
///
/// Returns `PasswordCommandError` if configuration, input or hashing fails.
pub fn run() -> Result<(), PasswordCommandError> {
    dotenvy::dotenv().ok();

    let hasher = CredentialHasher::new(&HashingConfig::from_env()?)?;
    let hash = hash_line(&hasher, std::io::stdin().lock())?;

    #[allow(clippy::print_stdout)]
    {
        println!("{hash}");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn hasher() -> CredentialHasher {
        CredentialHasher::new(&HashingConfig {
            memory_kib: Some(1024),
            iterations: Some(1),
            parallelism: Some(1),
        })
        .unwrap()
    }

    #[test]
    fn test_hash_line_uses_first_line() {
        let hasher = hasher();
        let hash = hash_line(&hasher, "clave-segura\nignorada\n".as_bytes()).unwrap();
        assert!(hasher.verify("clave-segura", &hash));
    }

    #[test]
    fn test_hash_line_rejects_empty_input() {
        assert!(matches!(
            hash_line(&hasher(), "".as_bytes()),
            Err(PasswordCommandError::Empty)
        ));
    }

    #[test]
    fn test_hash_line_applies_minimum_length() {
        let err = hash_line(&hasher(), "corta\n".as_bytes()).unwrap_err();
        assert!(matches!(err, PasswordCommandError::Weak(AuthError::WeakPassword(_))));
        assert!(err.to_string().contains("La clave debe tener al menos 8 caracteres"));

        assert!(hash_line(&hasher(), "ocho1234".as_bytes()).is_ok());
    }
}
