//! Commune repository (read-only reference data).

use sqlx::PgPool;

use ferremas_core::CommuneId;

use super::RepositoryError;
use crate::models::commune::Commune;

/// Repository for commune lookups.
pub struct CommuneRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> CommuneRepository<'a> {
    /// Create a new commune repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all communes ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Commune>, RepositoryError> {
        let communes = sqlx::query_as::<_, Commune>(
            "SELECT id_comuna, nombre FROM ferremas.comuna ORDER BY nombre",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(communes)
    }

    /// Get a commune by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: CommuneId) -> Result<Option<Commune>, RepositoryError> {
        let commune = sqlx::query_as::<_, Commune>(
            "SELECT id_comuna, nombre FROM ferremas.comuna WHERE id_comuna = $1",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(commune)
    }
}
