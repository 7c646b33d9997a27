//! User repository for database operations.
//!
//! Queries use the runtime `sqlx::query_as` API with bound parameters.
//! Column lists are spelled out per query so row types stay explicit.

use sqlx::PgPool;

use ferremas_core::{Email, Rut};

use super::RepositoryError;
use super::partial_update::{Column, PartialUpdate};
use crate::models::user::{NewUser, User, UserWithPassword};

/// Updatable columns of `ferremas.usuario`.
///
/// This is the complete whitelist for partial and full updates; the password
/// and the mandatory-change flag are only written by [`UserRepository::set_password`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserColumn {
    Nombre,
    Apellido,
    Email,
    Telefono,
    Rol,
    IdComuna,
}

impl Column for UserColumn {
    const TABLE: &'static str = "ferremas.usuario";
    const KEY: &'static str = "rut";

    fn name(self) -> &'static str {
        match self {
            Self::Nombre => "nombre",
            Self::Apellido => "apellido",
            Self::Email => "email",
            Self::Telefono => "telefono",
            Self::Rol => "rol",
            Self::IdComuna => "id_comuna",
        }
    }

    fn nullable(self) -> bool {
        matches!(self, Self::Telefono | Self::IdComuna)
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List all users ordered by RUT.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<User>, RepositoryError> {
        let users = sqlx::query_as::<_, User>(
            r"
            SELECT rut, nombre, apellido, email, telefono, rol, id_comuna,
                   cambio_clave_obligatorio, creado_en
            FROM ferremas.usuario
            ORDER BY rut
            ",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(users)
    }

    /// Get a user by RUT.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_rut(&self, rut: &Rut) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT rut, nombre, apellido, email, telefono, rol, id_comuna,
                   cambio_clave_obligatorio, creado_en
            FROM ferremas.usuario
            WHERE rut = $1
            ",
        )
        .bind(rut)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user by email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT rut, nombre, apellido, email, telefono, rol, id_comuna,
                   cambio_clave_obligatorio, creado_en
            FROM ferremas.usuario
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(user)
    }

    /// Get a user and their password hash by email (login).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_password_by_email(
        &self,
        email: &Email,
    ) -> Result<Option<UserWithPassword>, RepositoryError> {
        let row = sqlx::query_as::<_, UserWithPassword>(
            r"
            SELECT rut, nombre, apellido, email, telefono, rol, id_comuna,
                   cambio_clave_obligatorio, creado_en, clave
            FROM ferremas.usuario
            WHERE email = $1
            ",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await?;

        Ok(row)
    }

    /// Get a user's password hash by RUT.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_password_hash(&self, rut: &Rut) -> Result<Option<String>, RepositoryError> {
        let hash = sqlx::query_scalar::<_, String>(
            r"
            SELECT clave FROM ferremas.usuario WHERE rut = $1
            ",
        )
        .bind(rut)
        .fetch_optional(self.pool)
        .await?;

        Ok(hash)
    }

    /// Insert a user.
    ///
    /// Email and RUT are checked inside the insert's transaction so the
    /// common case gets a specific message; the unique constraints still
    /// decide under concurrent registrations.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email or RUT already exists.
    /// Returns `RepositoryError::Validation` if the commune does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, new_user: &NewUser) -> Result<User, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let email_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM ferremas.usuario WHERE email = $1)",
        )
        .bind(&new_user.email)
        .fetch_one(&mut *tx)
        .await?;
        if email_taken {
            return Err(RepositoryError::Conflict("Email ya registrado".to_owned()));
        }

        let rut_taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM ferremas.usuario WHERE rut = $1)",
        )
        .bind(&new_user.rut)
        .fetch_one(&mut *tx)
        .await?;
        if rut_taken {
            return Err(RepositoryError::Conflict("RUT ya registrado".to_owned()));
        }

        let user = sqlx::query_as::<_, User>(
            r"
            INSERT INTO ferremas.usuario
                (rut, nombre, apellido, email, telefono, clave, rol, id_comuna,
                 cambio_clave_obligatorio)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING rut, nombre, apellido, email, telefono, rol, id_comuna,
                      cambio_clave_obligatorio, creado_en
            ",
        )
        .bind(&new_user.rut)
        .bind(&new_user.nombre)
        .bind(&new_user.apellido)
        .bind(&new_user.email)
        .bind(&new_user.telefono)
        .bind(&new_user.password_hash)
        .bind(new_user.rol)
        .bind(new_user.id_comuna)
        .bind(new_user.cambio_clave_obligatorio)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| unknown_commune_as_validation(RepositoryError::from_write(e)))?;

        tx.commit().await?;

        Ok(user)
    }

    /// Apply a partial or full update to a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if the update is empty.
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new email is taken.
    /// Returns `RepositoryError::Validation` if the new commune does not exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn update(
        &self,
        rut: &Rut,
        update: &PartialUpdate<UserColumn>,
    ) -> Result<(), RepositoryError> {
        update
            .execute(self.pool, rut.clone())
            .await
            .map_err(unknown_commune_as_validation)
    }

    /// Replace a user's password hash and clear the mandatory-change flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn set_password(&self, rut: &Rut, password_hash: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE ferremas.usuario
            SET clave = $1, cambio_clave_obligatorio = FALSE
            WHERE rut = $2
            ",
        )
        .bind(password_hash)
        .bind(rut)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Delete a user by RUT.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if payments or dispatch records
    /// still reference the user.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, rut: &Rut) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM ferremas.usuario WHERE rut = $1")
            .bind(rut)
            .execute(self.pool)
            .await
            .map_err(|e| match RepositoryError::from_write(e) {
                RepositoryError::InvalidReference(_) => RepositoryError::Conflict(
                    "El usuario tiene pagos o despachos asociados".to_owned(),
                ),
                other => other,
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}

/// A user's only foreign key is the commune; a dangling one is bad input,
/// not a missing resource.
fn unknown_commune_as_validation(err: RepositoryError) -> RepositoryError {
    match err {
        RepositoryError::InvalidReference(msg) => RepositoryError::Validation(msg),
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::FieldValue;

    #[test]
    fn test_user_update_sql_uses_whitelisted_columns() {
        let mut update = PartialUpdate::new();
        update
            .set(UserColumn::Email, FieldValue::text("nuevo@ferremas.cl"))
            .set(UserColumn::IdComuna, FieldValue::Int(None));

        let rut = Rut::parse("11111111-1").unwrap();
        let builder = update.build(rut).unwrap();
        assert_eq!(
            builder.sql(),
            "UPDATE ferremas.usuario SET email = $1, id_comuna = $2 WHERE rut = $3"
        );
    }

    #[test]
    fn test_only_phone_and_commune_are_nullable() {
        let nullable: Vec<_> = [
            UserColumn::Nombre,
            UserColumn::Apellido,
            UserColumn::Email,
            UserColumn::Telefono,
            UserColumn::Rol,
            UserColumn::IdComuna,
        ]
        .into_iter()
        .filter(|c| c.nullable())
        .collect();

        assert_eq!(nullable, vec![UserColumn::Telefono, UserColumn::IdComuna]);
    }

    #[test]
    fn test_unknown_commune_is_bad_input() {
        let err = unknown_commune_as_validation(RepositoryError::InvalidReference(
            "Comuna no encontrada".to_owned(),
        ));
        assert!(matches!(err, RepositoryError::Validation(ref msg) if msg == "Comuna no encontrada"));

        let err = unknown_commune_as_validation(RepositoryError::Conflict(
            "Email ya registrado".to_owned(),
        ));
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }
}
