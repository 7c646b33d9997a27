//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use ferremas_core::{CommuneId, Email, Phone, Role, Rut};

/// A user account as returned by the API.
///
/// The password hash is deliberately not part of this type; see
/// [`UserWithPassword`].
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct User {
    pub rut: Rut,
    pub nombre: String,
    pub apellido: String,
    pub email: Email,
    pub telefono: Option<Phone>,
    pub rol: Role,
    pub id_comuna: Option<CommuneId>,
    pub cambio_clave_obligatorio: bool,
    #[serde(serialize_with = "super::serialize_timestamp")]
    pub creado_en: DateTime<Utc>,
}

/// A user together with the stored password hash (login and password change).
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserWithPassword {
    #[sqlx(flatten)]
    pub user: User,
    pub clave: String,
}

/// What a successful login returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserSummary {
    pub rut: Rut,
    pub nombre: String,
    pub apellido: String,
    pub email: Email,
    pub rol: Role,
    pub cambio_clave_obligatorio: bool,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            rut: user.rut,
            nombre: user.nombre,
            apellido: user.apellido,
            email: user.email,
            rol: user.rol,
            cambio_clave_obligatorio: user.cambio_clave_obligatorio,
        }
    }
}

/// A validated user ready to insert.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub rut: Rut,
    pub nombre: String,
    pub apellido: String,
    pub email: Email,
    pub telefono: Option<Phone>,
    pub password_hash: String,
    pub rol: Role,
    pub id_comuna: Option<CommuneId>,
    pub cambio_clave_obligatorio: bool,
}
