//! Database operations for the Ferremas `PostgreSQL` schema.
//!
//! # Schema: `ferremas`
//!
//! ## Tables
//!
//! - `usuario` - Accounts (clients and staff), keyed by RUT
//! - `pago` - Payments registered against a user
//! - `tipo_pago` - Payment types (static, IDs 1-3)
//! - `tipo_despacho` - Dispatch records (home delivery or store pickup)
//! - `comuna` - Communes (static)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/api/migrations/` and run via:
//! ```bash
//! cargo run -p ferremas-cli -- migrate
//! ```
//!
//! # Constraint violations
//!
//! Pre-checks in the services give friendly messages, but the constraints
//! below are what actually hold under concurrent writes. [`RepositoryError::from_write`]
//! turns their violations into typed errors.

pub mod communes;
pub mod dispatch;
pub mod partial_update;
pub mod payments;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use communes::CommuneRepository;
pub use dispatch::DispatchRepository;
pub use partial_update::{Column, FieldValue, PartialUpdate};
pub use payments::PaymentRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation (e.g., duplicate email).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Foreign key violation: a referenced row does not exist.
    #[error("invalid reference: {0}")]
    InvalidReference(String),

    /// Rejected input, either before the query ran or by a check constraint.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl RepositoryError {
    /// Classify an error from an INSERT/UPDATE/DELETE.
    ///
    /// Unique, foreign key and check violations become `Conflict`,
    /// `InvalidReference` and `Validation` with a user-facing message chosen
    /// by constraint name. Everything else stays `Database`.
    #[must_use]
    pub fn from_write(err: sqlx::Error) -> Self {
        let sqlx::Error::Database(ref db_err) = err else {
            return Self::Database(err);
        };

        let message = constraint_message(db_err.constraint()).to_owned();
        if db_err.is_unique_violation() {
            Self::Conflict(message)
        } else if db_err.is_foreign_key_violation() {
            Self::InvalidReference(message)
        } else if db_err.is_check_violation() {
            Self::Validation(message)
        } else {
            Self::Database(err)
        }
    }
}

/// User-facing message for a named constraint.
fn constraint_message(constraint: Option<&str>) -> &'static str {
    match constraint {
        Some("usuario_pkey") => "RUT ya registrado",
        Some("usuario_email_key") => "Email ya registrado",
        Some("usuario_id_comuna_fkey") => "Comuna no encontrada",
        Some("usuario_comuna_requerida") => "Debe indicar una comuna",
        Some("usuario_telefono_check") => "El teléfono debe tener exactamente 9 dígitos",
        Some("usuario_rol_check") => "Rol inválido",
        Some("pago_rut_usuario_fkey" | "tipo_despacho_rut_usuario_fkey") => {
            "Usuario no encontrado"
        }
        Some("pago_id_tipo_pago_fkey") => "Tipo de pago no válido",
        Some("pago_monto_check") => "El monto debe ser mayor a cero",
        Some("tipo_despacho_tipo_check") => "Tipo de despacho inválido",
        Some("tipo_despacho_destino") => {
            "Entrega a domicilio requiere solo dirección; retiro en tienda requiere solo sucursal"
        }
        _ => "Los datos enviados no son válidos",
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
/// * `max_connections` - Upper bound on pooled connections
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
    max_connections: u32,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_messages() {
        assert_eq!(
            constraint_message(Some("usuario_email_key")),
            "Email ya registrado"
        );
        assert_eq!(constraint_message(Some("usuario_pkey")), "RUT ya registrado");
        assert_eq!(
            constraint_message(Some("tipo_despacho_rut_usuario_fkey")),
            "Usuario no encontrado"
        );
        assert_eq!(
            constraint_message(None),
            "Los datos enviados no son válidos"
        );
    }

    #[test]
    fn test_from_write_keeps_non_database_errors() {
        let err = RepositoryError::from_write(sqlx::Error::RowNotFound);
        assert!(matches!(err, RepositoryError::Database(sqlx::Error::RowNotFound)));
    }
}
