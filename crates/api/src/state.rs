//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::HashingConfig;
use crate::services::password::{CredentialHasher, HashError};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like the database pool and the credential hasher.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    pool: PgPool,
    hasher: CredentialHasher,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `hashing` - Argon2 cost parameters
    /// * `pool` - `PostgreSQL` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if the configured hashing parameters are invalid.
    pub fn new(hashing: &HashingConfig, pool: PgPool) -> Result<Self, HashError> {
        let hasher = CredentialHasher::new(hashing)?;
        Ok(Self::with_hasher(pool, hasher))
    }

    /// Create application state around an existing hasher.
    #[must_use]
    pub fn with_hasher(pool: PgPool, hasher: CredentialHasher) -> Self {
        Self {
            inner: Arc::new(AppStateInner { pool, hasher }),
        }
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the credential hasher.
    #[must_use]
    pub fn hasher(&self) -> &CredentialHasher {
        &self.inner.hasher
    }
}
