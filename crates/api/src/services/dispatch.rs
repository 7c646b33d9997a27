//! Dispatch service.

use sqlx::PgPool;

use ferremas_core::{Destination, DispatchId, DispatchKind, Rut};

use crate::db::dispatch::{DispatchColumn, DispatchRepository};
use crate::db::{FieldValue, PartialUpdate, RepositoryError};
use crate::models::dispatch::NewDispatch;
use crate::services::users::Patch;

/// Sparse changes to a dispatch record.
#[derive(Debug, Clone, Default)]
pub struct DispatchPatch {
    pub tipo: Patch<DispatchKind>,
    pub direccion: Patch<String>,
    pub sucursal: Patch<String>,
}

impl DispatchPatch {
    fn into_update(self) -> PartialUpdate<DispatchColumn> {
        let mut update = PartialUpdate::new();
        update
            .set_if(
                DispatchColumn::Tipo,
                self.tipo
                    .map(|tipo| FieldValue::Text(tipo.map(|t| t.as_str().to_owned()))),
            )
            .set_if(DispatchColumn::Direccion, self.direccion.map(blank_as_null))
            .set_if(DispatchColumn::Sucursal, self.sucursal.map(blank_as_null));
        update
    }
}

fn blank_as_null(value: Option<String>) -> FieldValue {
    FieldValue::Text(value.filter(|v| !v.trim().is_empty()).map(|v| v.trim().to_owned()))
}

/// Dispatch registration and update service.
pub struct DispatchService<'a> {
    dispatch: DispatchRepository<'a>,
}

impl<'a> DispatchService<'a> {
    /// Create a new dispatch service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            dispatch: DispatchRepository::new(pool),
        }
    }

    /// Register a dispatch record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if the address/branch don't
    /// match the kind.
    /// Returns `RepositoryError::InvalidReference` if the user doesn't exist.
    pub async fn register(
        &self,
        rut_usuario: Rut,
        tipo: DispatchKind,
        direccion: Option<&str>,
        sucursal: Option<&str>,
    ) -> Result<DispatchId, RepositoryError> {
        let destino = Destination::new(tipo, direccion, sucursal)
            .map_err(|e| RepositoryError::Validation(e.to_string()))?;

        let id = self
            .dispatch
            .create(&NewDispatch {
                rut_usuario,
                destino,
            })
            .await?;

        tracing::info!(dispatch_id = %id, %tipo, "Dispatch registered");
        Ok(id)
    }

    /// Apply only the supplied fields, keeping the address/branch rule.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for an empty patch or a result
    /// that breaks the address/branch rule.
    /// Returns `RepositoryError::NotFound` if the record doesn't exist.
    pub async fn patch(&self, id: DispatchId, patch: DispatchPatch) -> Result<(), RepositoryError> {
        self.dispatch.update(id, &patch.into_update()).await?;
        tracing::info!(dispatch_id = %id, "Dispatch updated");
        Ok(())
    }
}
