//! Dispatch record repository.

use sqlx::PgPool;

use ferremas_core::{Destination, DispatchId, DispatchKind, Rut};

use super::RepositoryError;
use super::partial_update::{Column, FieldValue, PartialUpdate};
use crate::models::dispatch::{Dispatch, NewDispatch, UserDispatch};

/// Updatable columns of `ferremas.tipo_despacho`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchColumn {
    Tipo,
    Direccion,
    Sucursal,
}

impl Column for DispatchColumn {
    const TABLE: &'static str = "ferremas.tipo_despacho";
    const KEY: &'static str = "id";

    fn name(self) -> &'static str {
        match self {
            Self::Tipo => "tipo",
            Self::Direccion => "direccion",
            Self::Sucursal => "sucursal",
        }
    }

    fn nullable(self) -> bool {
        !matches!(self, Self::Tipo)
    }
}

/// Repository for dispatch database operations.
pub struct DispatchRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> DispatchRepository<'a> {
    /// Create a new dispatch repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List every dispatch record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Dispatch>, RepositoryError> {
        let records = sqlx::query_as::<_, Dispatch>(
            "SELECT id, rut_usuario, tipo, direccion, sucursal FROM ferremas.tipo_despacho ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    /// List a user's dispatch records.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by_user(&self, rut: &Rut) -> Result<Vec<UserDispatch>, RepositoryError> {
        let records = sqlx::query_as::<_, UserDispatch>(
            r"
            SELECT id, tipo, direccion, sucursal
            FROM ferremas.tipo_despacho
            WHERE rut_usuario = $1
            ORDER BY id
            ",
        )
        .bind(rut)
        .fetch_all(self.pool)
        .await?;

        Ok(records)
    }

    /// Insert a dispatch record after checking the user exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidReference` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, dispatch: &NewDispatch) -> Result<DispatchId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user_exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM ferremas.usuario WHERE rut = $1)",
        )
        .bind(&dispatch.rut_usuario)
        .fetch_one(&mut *tx)
        .await?;
        if !user_exists {
            return Err(RepositoryError::InvalidReference(
                "Usuario no encontrado".to_owned(),
            ));
        }

        let id = sqlx::query_scalar::<_, DispatchId>(
            r"
            INSERT INTO ferremas.tipo_despacho (rut_usuario, tipo, direccion, sucursal)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(&dispatch.rut_usuario)
        .bind(dispatch.destino.kind())
        .bind(dispatch.destino.address())
        .bind(dispatch.destino.branch())
        .fetch_one(&mut *tx)
        .await
        .map_err(RepositoryError::from_write)?;

        tx.commit().await?;

        Ok(id)
    }

    /// Apply a partial update to a dispatch record.
    ///
    /// The row is locked, the changes are merged over its current values and
    /// the result must still satisfy the address/branch exclusivity rule.
    /// Only the columns present in `update` are written.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for an empty update or when the
    /// merged record breaks the exclusivity rule.
    /// Returns `RepositoryError::NotFound` if the record doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        id: DispatchId,
        update: &PartialUpdate<DispatchColumn>,
    ) -> Result<(), RepositoryError> {
        update.validate()?;

        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, Dispatch>(
            r"
            SELECT id, rut_usuario, tipo, direccion, sucursal
            FROM ferremas.tipo_despacho
            WHERE id = $1
            FOR UPDATE
            ",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        merged_destination(&current, update)?;

        update.execute(&mut *tx, id).await?;

        tx.commit().await?;

        Ok(())
    }

    /// Delete a dispatch record by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the record doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: DispatchId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM ferremas.tipo_despacho WHERE id = $1")
            .bind(id)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

/// Overlay `update` on `current` and check the result is a valid destination.
fn merged_destination(
    current: &Dispatch,
    update: &PartialUpdate<DispatchColumn>,
) -> Result<Destination, RepositoryError> {
    let kind = match update.get(DispatchColumn::Tipo) {
        Some(FieldValue::Text(Some(tipo))) => tipo
            .parse::<DispatchKind>()
            .map_err(|e| RepositoryError::Validation(e.to_string()))?,
        _ => current.tipo,
    };

    let address = overlay_text(update.get(DispatchColumn::Direccion), &current.direccion);
    let branch = overlay_text(update.get(DispatchColumn::Sucursal), &current.sucursal);

    Destination::new(kind, address, branch).map_err(|e| RepositoryError::Validation(e.to_string()))
}

fn overlay_text<'v>(new: Option<&'v FieldValue>, current: &'v Option<String>) -> Option<&'v str> {
    match new {
        Some(value) => match value {
            FieldValue::Text(text) => text.as_deref(),
            FieldValue::Int(_) | FieldValue::Bool(_) => None,
        },
        None => current.as_deref(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn home_delivery() -> Dispatch {
        Dispatch {
            id: DispatchId::new(1),
            rut_usuario: Rut::parse("11111111-1").unwrap(),
            tipo: DispatchKind::HomeDelivery,
            direccion: Some("Los Aromos 45".to_owned()),
            sucursal: None,
        }
    }

    #[test]
    fn test_switching_kind_requires_swapping_location() {
        let mut update = PartialUpdate::new();
        update.set(DispatchColumn::Tipo, FieldValue::text("retiro en tienda"));

        let err = merged_destination(&home_delivery(), &update).unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(ref msg) if msg.contains("sucursal")));

        update
            .set(DispatchColumn::Direccion, FieldValue::Text(None))
            .set(DispatchColumn::Sucursal, FieldValue::text("Maipú"));
        let merged = merged_destination(&home_delivery(), &update).unwrap();
        assert_eq!(
            merged,
            Destination::Store {
                branch: "Maipú".to_owned()
            }
        );
    }

    #[test]
    fn test_address_change_keeps_kind() {
        let mut update = PartialUpdate::new();
        update.set(DispatchColumn::Direccion, FieldValue::text("Av. Matta 123"));

        let merged = merged_destination(&home_delivery(), &update).unwrap();
        assert_eq!(merged.address(), Some("Av. Matta 123"));
    }

    #[test]
    fn test_adding_branch_to_home_delivery_is_rejected() {
        let mut update = PartialUpdate::new();
        update.set(DispatchColumn::Sucursal, FieldValue::text("Centro"));

        assert!(merged_destination(&home_delivery(), &update).is_err());
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let mut update = PartialUpdate::new();
        update.set(DispatchColumn::Tipo, FieldValue::text("dron"));

        let err = merged_destination(&home_delivery(), &update).unwrap_err();
        assert!(
            matches!(err, RepositoryError::Validation(ref msg) if msg == "Tipo de despacho inválido")
        );
    }

    #[test]
    fn test_update_sql() {
        let mut update = PartialUpdate::new();
        update.set(DispatchColumn::Direccion, FieldValue::text("Av. Matta 123"));

        assert_eq!(
            update.build(DispatchId::new(3)).unwrap().sql(),
            "UPDATE ferremas.tipo_despacho SET direccion = $1 WHERE id = $2"
        );
    }
}
