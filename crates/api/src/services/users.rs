//! User update service.
//!
//! Turns typed full/partial changes into a [`PartialUpdate`] over the
//! whitelisted [`UserColumn`]s.

use sqlx::PgPool;

use ferremas_core::{CommuneId, Email, Phone, Role, Rut};

use crate::db::users::{UserColumn, UserRepository};
use crate::db::{FieldValue, PartialUpdate, RepositoryError};

/// A field of a partial update: absent (`None`), explicit null
/// (`Some(None)`) or a new value.
pub type Patch<T> = Option<Option<T>>;

/// Replacement values for a full update.
#[derive(Debug, Clone)]
pub struct UserChanges {
    pub nombre: String,
    pub apellido: String,
    pub email: Email,
    pub telefono: Option<Phone>,
    pub id_comuna: Option<CommuneId>,
}

/// Sparse changes for a partial update.
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub nombre: Patch<String>,
    pub apellido: Patch<String>,
    pub email: Patch<Email>,
    pub telefono: Patch<Phone>,
    pub rol: Patch<Role>,
    pub id_comuna: Patch<CommuneId>,
}

impl UserChanges {
    fn into_update(self) -> PartialUpdate<UserColumn> {
        let mut update = PartialUpdate::new();
        update
            .set(UserColumn::Nombre, FieldValue::text(self.nombre))
            .set(UserColumn::Apellido, FieldValue::text(self.apellido))
            .set(UserColumn::Email, FieldValue::text(self.email.into_inner()))
            .set(UserColumn::Telefono, phone_value(self.telefono))
            .set(UserColumn::IdComuna, commune_value(self.id_comuna));
        update
    }
}

impl UserPatch {
    fn into_update(self) -> PartialUpdate<UserColumn> {
        let mut update = PartialUpdate::new();
        update
            .set_if(UserColumn::Nombre, self.nombre.map(FieldValue::Text))
            .set_if(UserColumn::Apellido, self.apellido.map(FieldValue::Text))
            .set_if(
                UserColumn::Email,
                self.email
                    .map(|email| FieldValue::Text(email.map(Email::into_inner))),
            )
            .set_if(UserColumn::Telefono, self.telefono.map(phone_value))
            .set_if(
                UserColumn::Rol,
                self.rol
                    .map(|rol| FieldValue::Text(rol.map(|r| r.as_str().to_owned()))),
            )
            .set_if(UserColumn::IdComuna, self.id_comuna.map(commune_value));
        update
    }
}

fn phone_value(phone: Option<Phone>) -> FieldValue {
    FieldValue::Text(phone.map(String::from))
}

fn commune_value(id: Option<CommuneId>) -> FieldValue {
    FieldValue::Int(id.map(i32::from))
}

/// User update service.
pub struct UserService<'a> {
    users: UserRepository<'a>,
}

impl<'a> UserService<'a> {
    /// Create a new user service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
        }
    }

    /// Replace a user's profile fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the email is taken.
    /// Returns `RepositoryError::Validation` if the role needs a commune.
    pub async fn update(&self, rut: &Rut, changes: UserChanges) -> Result<(), RepositoryError> {
        self.users.update(rut, &changes.into_update()).await?;
        tracing::info!(%rut, "User updated");
        Ok(())
    }

    /// Apply only the supplied fields.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if nothing was supplied or a
    /// required field is set to null, before touching the database.
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the email is taken.
    pub async fn patch(&self, rut: &Rut, patch: UserPatch) -> Result<(), RepositoryError> {
        let update = patch.into_update();
        self.users.update(rut, &update).await?;
        tracing::info!(%rut, "User partially updated");
        Ok(())
    }

    /// Delete a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if payments or dispatch records
    /// reference the user.
    pub async fn delete(&self, rut: &Rut) -> Result<(), RepositoryError> {
        self.users.delete(rut).await?;
        tracing::info!(%rut, "User deleted");
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_full_update_sets_every_profile_column() {
        let changes = UserChanges {
            nombre: "Ana".to_owned(),
            apellido: "Rojas".to_owned(),
            email: Email::parse("ana@ferremas.cl").unwrap(),
            telefono: None,
            id_comuna: Some(CommuneId::new(2)),
        };

        let update = changes.into_update();
        assert_eq!(update.get(UserColumn::Telefono), Some(&FieldValue::Text(None)));
        assert_eq!(update.get(UserColumn::IdComuna), Some(&FieldValue::Int(Some(2))));
        assert!(update.get(UserColumn::Rol).is_none());
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_empty_patch_is_empty_update() {
        let update = UserPatch::default().into_update();
        assert!(update.is_empty());
        assert!(matches!(update.validate(), Err(RepositoryError::Validation(_))));
    }

    #[test]
    fn test_patch_distinguishes_null_from_absent() {
        let patch = UserPatch {
            telefono: Some(None),
            rol: Some(Some(Role::Bodeguero)),
            ..UserPatch::default()
        };

        let update = patch.into_update();
        assert_eq!(update.get(UserColumn::Telefono), Some(&FieldValue::Text(None)));
        assert_eq!(update.get(UserColumn::Rol), Some(&FieldValue::text("bodeguero")));
        assert!(update.get(UserColumn::Nombre).is_none());
        assert!(update.validate().is_ok());
    }

    #[test]
    fn test_null_name_is_rejected() {
        let patch = UserPatch {
            nombre: Some(None),
            ..UserPatch::default()
        };

        let err = patch.into_update().validate().unwrap_err();
        assert!(matches!(err, RepositoryError::Validation(ref msg) if msg.contains("nombre")));
    }
}
